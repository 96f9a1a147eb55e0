// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small declarative macros shared by the relprep crates.

/// `Display` for a fieldless enum, one string per variant.
///
/// ```ignore
/// relprep_core::simple_display! {
///     JobState {
///         Created => "created",
///         Finished => "finished",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $text:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $text, )+
                })
            }
        }
    };
}

/// Chainable setters for plain config fields, used inside an `impl` block.
///
/// ```ignore
/// impl JobConfig {
///     relprep_core::setters! {
///         set { ignore_cache: bool, quiet: bool }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (set { $( $field:ident : $ty:ty ),* $(,)? }) => {
        $(
            pub fn $field(mut self, value: $ty) -> Self {
                self.$field = value;
                self
            }
        )*
    };
}
