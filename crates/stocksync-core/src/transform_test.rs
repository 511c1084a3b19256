use super::*;

fn make_source_product(code: i64, name: &str) -> SourceProduct {
    SourceProduct {
        code,
        name: name.to_string(),
        size: Some("40".to_string()),
        color: Some("Negro".to_string()),
        brand_description: Some("Topper".to_string()),
        list_price: Decimal::new(100, 0),
        synonym_code: Some("42".to_string()),
        total_stock: 3,
        offer_percentage: None,
    }
}

// -----------------------------------------------------------------------
// image_url
// -----------------------------------------------------------------------

#[test]
fn image_url_pads_short_code_to_thirteen_digits() {
    assert_eq!(
        image_url("42"),
        "https://evirtual.calzalindo.com.ar:58000/clz_ventas/static/images/imagenes_macroges/0001AR0000000-0000000000042000001.jpg"
    );
}

#[test]
fn image_url_segment_is_thirteen_chars_for_any_width() {
    for code in ["1", "123456", "123456789012", "1234567890123"] {
        let url = image_url(code);
        let segment = url
            .strip_prefix(IMAGE_URL_PREFIX)
            .and_then(|rest| rest.strip_suffix(IMAGE_URL_SUFFIX))
            .unwrap();
        assert_eq!(segment.len(), 13, "code {code} produced {segment}");
        assert!(segment.ends_with(code));
    }
}

#[test]
fn image_url_does_not_truncate_long_codes() {
    let url = image_url("12345678901234");
    assert!(url.contains("-12345678901234000001.jpg"), "got {url}");
}

#[test]
fn image_url_keeps_sign_ahead_of_zero_padding() {
    let url = image_url("-42");
    assert!(url.contains("0001AR0000000--000000000042000001.jpg"), "got {url}");
    let url = image_url("+7");
    assert!(url.contains("0001AR0000000-+000000000007000001.jpg"), "got {url}");
}

#[test]
fn image_url_trims_padding_from_char_columns() {
    assert_eq!(image_url(" 42 "), image_url("42"));
}

// -----------------------------------------------------------------------
// classify_category
// -----------------------------------------------------------------------

#[test]
fn classify_sport_keywords() {
    assert_eq!(classify_category("ZAPATILLA RUNNING", None), Category::Sport);
    assert_eq!(classify_category("Calzado Deportivo", None), Category::Sport);
}

#[test]
fn classify_each_rule() {
    assert_eq!(classify_category("Bota de lluvia", None), Category::Boots);
    assert_eq!(classify_category("Sandalia playa", None), Category::Sandals);
    assert_eq!(classify_category("Zapato vestir", None), Category::Shoes);
    assert_eq!(classify_category("Ojotas", None), Category::Other);
}

#[test]
fn classify_first_rule_wins() {
    // Both "bota" and "sandalia" match; boots is checked first.
    assert_eq!(classify_category("sandalia bota", None), Category::Boots);
    assert_eq!(classify_category("zapatilla bota", None), Category::Sport);
}

#[test]
fn classify_sport_outranks_shoes() {
    assert_eq!(classify_category("zapato deportivo", None), Category::Sport);
}

#[test]
fn classify_empty_name_is_other() {
    assert_eq!(classify_category("", None), Category::Other);
}

#[test]
fn classify_ignores_brand() {
    assert_eq!(
        classify_category("Remera", Some("Zapatilla Corp")),
        Category::Other
    );
}

// -----------------------------------------------------------------------
// final_price
// -----------------------------------------------------------------------

#[test]
fn final_price_without_discount_is_list_price() {
    assert_eq!(
        final_price(Decimal::new(100, 0), Some(Decimal::ZERO)),
        Decimal::new(10000, 2)
    );
}

#[test]
fn final_price_applies_percentage() {
    assert_eq!(
        final_price(Decimal::new(100, 0), Some(Decimal::new(20, 0))),
        Decimal::new(8000, 2)
    );
}

#[test]
fn final_price_missing_offer_keeps_list_price() {
    let list = Decimal::new(9999, 2);
    assert_eq!(final_price(list, None), list);
}

#[test]
fn final_price_negative_offer_is_ignored() {
    let list = Decimal::new(5000, 2);
    assert_eq!(final_price(list, Some(Decimal::new(-10, 0))), list);
}

#[test]
fn final_price_rounds_to_cents() {
    // 99.99 * 0.85 = 84.9915
    assert_eq!(
        final_price(Decimal::new(9999, 2), Some(Decimal::new(15, 0))),
        Decimal::new(8499, 2)
    );
}

#[test]
fn final_price_rounds_midpoint_to_even() {
    // 20.25 * 0.5 = 10.125
    assert_eq!(
        final_price(Decimal::new(2025, 2), Some(Decimal::new(50, 0))),
        Decimal::new(1012, 2)
    );
}

// -----------------------------------------------------------------------
// to_target
// -----------------------------------------------------------------------

#[test]
fn to_target_derives_all_fields() {
    let mut source = make_source_product(1001, "Zapatilla Urbana");
    source.offer_percentage = Some(Decimal::new(20, 0));

    let target = to_target(&source);

    assert_eq!(target.code, 1001);
    assert_eq!(target.name, "Zapatilla Urbana");
    assert_eq!(target.size.as_deref(), Some("40"));
    assert_eq!(target.color.as_deref(), Some("Negro"));
    assert_eq!(target.brand_description.as_deref(), Some("Topper"));
    assert_eq!(target.final_price, Decimal::new(8000, 2));
    assert_eq!(target.available_stock, 3);
    assert_eq!(target.category, Category::Sport);
    assert_eq!(target.image_url, Some(image_url("42")));
}

#[test]
fn to_target_without_synonym_has_no_image() {
    let mut source = make_source_product(7, "Bota");
    source.synonym_code = None;
    assert!(to_target(&source).image_url.is_none());

    source.synonym_code = Some("   ".to_string());
    assert!(to_target(&source).image_url.is_none());
}
