use std::{
    collections::HashMap,
    fs,
    hash::Hash,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    models::{
        average_rating, Category, PaymentMethod, Product, ProductDetail, ProductSummary, Review,
        ReviewRecord, Seller,
    },
    services::generate_recommendations,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Catalog is inconsistent: {0}")]
    Inconsistent(String),

    #[error("Product '{product_id}' references unknown {kind} '{reference}'")]
    DanglingReference {
        product_id: String,
        kind: &'static str,
        reference: String,
    },
}

/// Raw catalog tables as they appear on disk
#[derive(Debug, Clone, Default)]
pub struct CatalogData {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub sellers: Vec<Seller>,
    pub reviews: Vec<ReviewRecord>,
    pub payment_methods: Vec<PaymentMethod>,
}

/// In-memory, read-only product catalog.
///
/// Loaded once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards, so request handlers read it without locking.
#[derive(Debug)]
pub struct CatalogStore {
    products: Vec<Product>,
    product_index: HashMap<String, usize>,
    categories: HashMap<i64, Category>,
    sellers: HashMap<String, Seller>,
    reviews: HashMap<String, Vec<ReviewRecord>>,
    payment_methods: HashMap<i64, PaymentMethod>,
}

/// Indexes `items` by `key`, rejecting repeated keys
fn index_by<K, T>(
    items: Vec<T>,
    kind: &'static str,
    key: impl Fn(&T) -> K,
) -> Result<HashMap<K, T>, StoreError>
where
    K: Eq + Hash + ToString,
{
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        let k = key(&item);
        if index.contains_key(&k) {
            return Err(StoreError::DuplicateId {
                kind,
                id: k.to_string(),
            });
        }
        index.insert(k, item);
    }
    Ok(index)
}

fn read_table<T: DeserializeOwned>(data_dir: &Path, file: &str) -> Result<Vec<T>, StoreError> {
    let path = data_dir.join(file);
    let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse { path, source })
}

impl CatalogStore {
    /// Loads every catalog table from `data_dir`
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();

        let data = CatalogData {
            products: read_table(data_dir, "products.json")?,
            categories: read_table(data_dir, "categories.json")?,
            sellers: read_table(data_dir, "sellers.json")?,
            reviews: read_table(data_dir, "reviews.json")?,
            payment_methods: read_table(data_dir, "payment_methods.json")?,
        };

        let store = Self::from_parts(data)?;

        tracing::info!(
            data_dir = %data_dir.display(),
            products = store.products.len(),
            categories = store.categories.len(),
            sellers = store.sellers.len(),
            "Catalog loaded"
        );

        Ok(store)
    }

    /// Builds the indexed store and checks referential integrity
    pub fn from_parts(data: CatalogData) -> Result<Self, StoreError> {
        let categories = index_by(data.categories, "category", |c| c.id)?;
        let sellers = index_by(data.sellers, "seller", |s| s.id.clone())?;
        let payment_methods = index_by(data.payment_methods, "payment method", |m| m.id)?;

        let mut product_index = HashMap::with_capacity(data.products.len());
        for (idx, product) in data.products.iter().enumerate() {
            if product_index.insert(product.id.clone(), idx).is_some() {
                return Err(StoreError::DuplicateId {
                    kind: "product",
                    id: product.id.clone(),
                });
            }

            if !categories.contains_key(&product.category_id) {
                return Err(StoreError::DanglingReference {
                    product_id: product.id.clone(),
                    kind: "category",
                    reference: product.category_id.to_string(),
                });
            }

            if !sellers.contains_key(&product.seller_id) {
                return Err(StoreError::DanglingReference {
                    product_id: product.id.clone(),
                    kind: "seller",
                    reference: product.seller_id.clone(),
                });
            }

            if let Some(missing) = product
                .accepted_payment_method_ids
                .iter()
                .find(|id| !payment_methods.contains_key(*id))
            {
                return Err(StoreError::DanglingReference {
                    product_id: product.id.clone(),
                    kind: "payment method",
                    reference: missing.to_string(),
                });
            }
        }

        let mut reviews: HashMap<String, Vec<ReviewRecord>> = HashMap::new();
        for review in data.reviews {
            reviews.entry(review.product_id.clone()).or_default().push(review);
        }

        Ok(Self {
            products: data.products,
            product_index,
            categories,
            sellers,
            reviews,
            payment_methods,
        })
    }

    /// The full product corpus, in file order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.product_index.get(id).map(|&idx| &self.products[idx])
    }

    fn reviews_for(&self, product_id: &str) -> &[ReviewRecord] {
        self.reviews
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn summarize(&self, product: &Product) -> ProductSummary {
        ProductSummary {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price.clone(),
            image: product.images.first().cloned().unwrap_or_default(),
            average_rating: average_rating(self.reviews_for(&product.id)),
        }
    }

    /// Lists product summaries, optionally filtered by exact category name
    /// and brand. No match is an empty list.
    pub fn find_all_products(
        &self,
        category: Option<&str>,
        brand: Option<&str>,
    ) -> Vec<ProductSummary> {
        self.products
            .iter()
            .filter(|p| brand.map_or(true, |b| p.brand.as_deref() == Some(b)))
            .filter(|p| {
                category.map_or(true, |name| {
                    self.categories
                        .get(&p.category_id)
                        .is_some_and(|c| c.name == name)
                })
            })
            .map(|p| self.summarize(p))
            .collect()
    }

    /// Summaries for `ids`, in the given order. Unknown ids are skipped.
    pub fn find_products_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<ProductSummary> {
        ids.iter()
            .filter_map(|id| self.product(id.as_ref()))
            .map(|p| self.summarize(p))
            .collect()
    }

    /// Related products for `id`, most similar first. `None` when the
    /// product does not exist.
    pub fn related_products(&self, id: &str, top_n: usize) -> Option<Vec<ProductSummary>> {
        let product = self.product(id)?;
        let ids = generate_recommendations(id, product.category_id, &self.products, top_n);
        Some(self.find_products_by_ids(&ids))
    }

    /// Product joined with its category, seller, reviews, payment methods
    /// and related products. `Ok(None)` when the product does not exist; a
    /// broken reference is an error, not a missing product.
    pub fn find_product_details(
        &self,
        id: &str,
        top_n: usize,
    ) -> Result<Option<ProductDetail>, StoreError> {
        let Some(product) = self.product(id) else {
            return Ok(None);
        };

        let category = self
            .categories
            .get(&product.category_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::Inconsistent(format!(
                    "product '{}' has no category {}",
                    id, product.category_id
                ))
            })?;
        let seller = self.sellers.get(&product.seller_id).cloned().ok_or_else(|| {
            StoreError::Inconsistent(format!(
                "product '{}' has no seller '{}'",
                id, product.seller_id
            ))
        })?;

        let reviews = self.reviews_for(id);
        let accepted_payment_methods = product
            .accepted_payment_method_ids
            .iter()
            .map(|pm| {
                self.payment_methods.get(pm).cloned().ok_or_else(|| {
                    StoreError::Inconsistent(format!(
                        "product '{}' has no payment method {}",
                        id, pm
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let related_products = self.related_products(id, top_n).unwrap_or_default();

        Ok(Some(ProductDetail {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price.clone(),
            description: product.description.clone().unwrap_or_default(),
            images: product.images.clone(),
            stock: product.stock,
            average_rating: average_rating(reviews),
            category,
            seller,
            reviews: reviews.iter().map(Review::from).collect(),
            accepted_payment_methods,
            specifications: product.specifications.clone(),
            related_products,
        }))
    }
}
