use serde::{Deserialize, Serialize};

/// Product price in a given currency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerReputation {
    pub level: String,
    pub score: f64,
}

/// Seller information shown on the detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub is_official_store: bool,
    pub reputation: SellerReputation,
}

/// A single review as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

/// Review row as stored in `reviews.json`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

impl From<&ReviewRecord> for Review {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            author: record.author.clone(),
            rating: record.rating,
            comment: record.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

/// Category-specific attributes. Every field is optional since smartphones,
/// furniture and stationery share this one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductSpecifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_camera_resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_assembly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_per_package: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ink_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_size: Option<String>,
}

/// Product record as stored in `products.json`.
///
/// This is also the corpus entry consumed by the recommender, which only
/// reads `id`, `category_id`, `title` and `description`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    pub category_id: i64,
    pub seller_id: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub accepted_payment_method_ids: Vec<i64>,
    #[serde(default)]
    pub specifications: ProductSpecifications,
}

impl Product {
    /// Text the recommender vectorizes: title, one space, then description
    /// (empty when absent).
    pub fn feature_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }
}

/// Compact product shape used for listings and related products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub price: Price,
    /// Primary image, empty when the product has none
    pub image: String,
    pub average_rating: f64,
}

/// Enriched product returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    pub id: String,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub images: Vec<String>,
    pub stock: u32,
    pub average_rating: f64,
    pub category: Category,
    pub seller: Seller,
    pub reviews: Vec<Review>,
    pub accepted_payment_methods: Vec<PaymentMethod>,
    pub specifications: ProductSpecifications,
    pub related_products: Vec<ProductSummary>,
}

/// Mean rating rounded to two decimals, `0.0` without reviews
pub fn average_rating<'a>(reviews: impl IntoIterator<Item = &'a ReviewRecord>) -> f64 {
    let (sum, count) = reviews
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), r| (sum + r.rating as u32, count + 1));

    if count == 0 {
        return 0.0;
    }

    let mean = sum as f64 / count as f64;
    (mean * 100.0).round() / 100.0
}
