//! Upload a blood-cell smear, chest X-ray or brain MRI and get a label back
//! from the matching pre-trained classifier.

pub mod auth;
pub mod category;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod error;
pub mod handlers;
pub mod models;
pub mod preprocess;
pub mod session;
pub mod state;

pub use category::Category;
pub use decision::Label;
pub use error::AppError;
