//! Data models
//!
//! Records as stored in SurrealDB, plus the request payloads and list filters
//! each API accepts. Timestamps are Unix millis.

/// Closed set of string values stored as-is in the database
///
/// Generates serde (de)serialization, `as_str`, `ALL`, `Display` and `Default`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod serde_helpers;

pub mod asset;
pub mod category;
pub mod client;
pub mod incident;
pub mod maintenance;
pub mod requisition;
pub mod responsive_form;
pub mod user;

pub use asset::*;
pub use category::*;
pub use client::*;
pub use incident::*;
pub use maintenance::*;
pub use requisition::*;
pub use responsive_form::*;
pub use user::*;

use shared::PageQuery;

/// `page` / `limit` carried by every list filter
pub trait PageParams {
    fn page(&self) -> Option<u32>;
    fn limit(&self) -> Option<u32>;

    fn page_query(&self) -> PageQuery {
        let defaults = PageQuery::default();
        PageQuery::new(
            self.page().unwrap_or(defaults.page),
            self.limit().unwrap_or(defaults.limit),
        )
    }
}

macro_rules! impl_page_params {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PageParams for $ty {
                fn page(&self) -> Option<u32> {
                    self.page
                }
                fn limit(&self) -> Option<u32> {
                    self.limit
                }
            }
        )*
    };
}

impl_page_params!(
    AssetFilter,
    IncidentFilter,
    MaintenanceFilter,
    ResponsiveFormFilter,
    RequisitionFilter,
);
