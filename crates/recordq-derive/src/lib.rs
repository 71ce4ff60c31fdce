//! Derive macros for recordq
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive `Record` (and `FromRow`) for a struct holding an `Attributes` store.
///
/// # Example
///
/// ```ignore
/// use recordq::{Attributes, Record};
///
/// #[derive(Debug, Record)]
/// #[record(table = "wp_posts", casts(id = "int", menu_order = "integer", sticky = "bool"))]
/// struct Post {
///     attrs: Attributes,
/// }
/// ```
///
/// # Attributes
///
/// - `#[record(table = "name")]` - Table name (default: snake_case struct name)
/// - `#[record(casts(column = "kind", ...))]` - Column casts; kinds are `int`,
///   `float`, `boolean`, `datetime` and the aliases `integer`, `number`, `bool`.
///   Replaces the default `id = "int"`.
/// - `#[record(casts(column(cast = path::to_fn, decast = path::to_fn)))]` - Custom
///   `fn(Value) -> Value` transforms; either direction may be omitted
/// - `#[record(attributes)]` on a field - The `Attributes` store, when the field
///   type is not literally named `Attributes`
///
/// Every other field is initialized with `Default::default()`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
