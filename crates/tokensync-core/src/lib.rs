#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod claims;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod record;
pub mod settings;
pub mod status;

pub use crate::claims::*;
pub use crate::constants::*;
pub use crate::credentials::*;
pub use crate::error::*;
pub use crate::guard::*;
pub use crate::record::*;
pub use crate::settings::*;
pub use crate::status::*;
