use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product row read from the ERP, one per product with positive stock in
/// the configured warehouses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProduct {
    /// ERP article code; the conflict key on the target side.
    pub code: i64,
    /// Empty when the ERP leaves the description blank.
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    /// `None` when the article has no matching brand row.
    pub brand_description: Option<String>,
    pub list_price: Decimal,
    /// Alternate article id used only for the image URL.
    pub synonym_code: Option<String>,
    /// Sum of stock across the configured warehouses; always `> 0` when read
    /// through the in-stock query.
    pub total_stock: i64,
    /// Promotion percentage in `0..=100`. `None` and zero both mean "no offer".
    pub offer_percentage: Option<Decimal>,
}

/// Coarse storefront category derived from the product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Category {
    Sport,
    Boots,
    Sandals,
    Shoes,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Sport,
        Category::Boots,
        Category::Sandals,
        Category::Shoes,
        Category::Other,
    ];

    /// Numeric code stored in the target `subrubro` column.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Category::Sport => 1,
            Category::Boots => 2,
            Category::Sandals => 3,
            Category::Shoes => 4,
            Category::Other => 5,
        }
    }
}

impl From<Category> for i16 {
    fn from(category: Category) -> Self {
        category.code()
    }
}

impl TryFrom<i16> for Category {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| format!("unknown category code {code}"))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Sport => write!(f, "sport"),
            Category::Boots => write!(f, "boots"),
            Category::Sandals => write!(f, "sandals"),
            Category::Shoes => write!(f, "shoes"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// The derived row written to the storefront database, keyed by `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProduct {
    pub code: i64,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand_description: Option<String>,
    /// List price after the promotion discount, rounded to cents.
    pub final_price: Decimal,
    pub available_stock: i64,
    pub category: Category,
    /// `None` when the source row carries no synonym code.
    pub image_url: Option<String>,
}
