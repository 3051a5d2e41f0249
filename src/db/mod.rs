pub mod connection;
pub mod error_context;
pub mod feature;
pub mod transaction;

pub use connection::{PgClient, mask_url_password};
pub use feature::{Feature, FeatureGate, ServerVersion};
pub use transaction::{CommentTransaction, ConnectionProvider, ScopedTransaction};
