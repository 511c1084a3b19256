//! Pure derivations from a [`SourceProduct`] to a [`TargetProduct`].
//!
//! Nothing here touches a database; the sink calls [`to_target`] once per row.

use rust_decimal::Decimal;

use crate::products::{Category, SourceProduct, TargetProduct};

const IMAGE_URL_PREFIX: &str = "https://evirtual.calzalindo.com.ar:58000/clz_ventas/static/images/imagenes_macroges/0001AR0000000-";
const IMAGE_URL_SUFFIX: &str = "000001.jpg";
const SYNONYM_CODE_WIDTH: usize = 13;

/// Keyword rules checked in order against the lowercased product name.
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["zapatilla", "deportiv"], Category::Sport),
    (&["bota"], Category::Boots),
    (&["sandalia"], Category::Sandals),
    (&["zapato"], Category::Shoes),
];

/// Builds the static image URL for a synonym code, left-padding the code with
/// zeros to 13 characters.
///
/// A leading `+` or `-` stays in front of the zeros (`-42` becomes
/// `-000000000042`). Codes already 13 characters or longer are embedded as-is.
#[must_use]
pub fn image_url(synonym_code: &str) -> String {
    let code = synonym_code.trim();
    let (sign, digits) = match code.as_bytes().first() {
        Some(b'+' | b'-') => code.split_at(1),
        _ => ("", code),
    };
    format!(
        "{IMAGE_URL_PREFIX}{sign}{digits:0>width$}{IMAGE_URL_SUFFIX}",
        width = SYNONYM_CODE_WIDTH - sign.len(),
    )
}

/// Classifies a product by case-insensitive keyword match on its name; the
/// first matching rule wins and unmatched names fall back to
/// [`Category::Other`].
///
/// `brand` is accepted so callers do not change when brand-based rules are
/// added; no rule reads it today.
#[must_use]
pub fn classify_category(name: &str, _brand: Option<&str>) -> Category {
    let name = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map_or(Category::Other, |(_, category)| *category)
}

/// Applies a percentage discount to the list price, rounded to cents with
/// banker's rounding. A missing or non-positive percentage leaves the list
/// price untouched, including its scale.
#[must_use]
pub fn final_price(list_price: Decimal, offer_percentage: Option<Decimal>) -> Decimal {
    match offer_percentage {
        Some(pct) if pct > Decimal::ZERO => {
            (list_price * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)).round_dp(2)
        }
        _ => list_price,
    }
}

/// Derives the storefront row for one ERP product.
#[must_use]
pub fn to_target(product: &SourceProduct) -> TargetProduct {
    let url = product
        .synonym_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(image_url);

    TargetProduct {
        code: product.code,
        name: product.name.clone(),
        size: product.size.clone(),
        color: product.color.clone(),
        brand_description: product.brand_description.clone(),
        final_price: final_price(product.list_price, product.offer_percentage),
        available_stock: product.total_stock,
        category: classify_category(&product.name, product.brand_description.as_deref()),
        image_url: url,
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
