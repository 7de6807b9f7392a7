pub mod recommender;

pub use recommender::{generate_recommendations, validate_top_n, RecommenderError};
