//! Derive macros for Tidyboard
//!
//! This crate provides procedural macros to reduce boilerplate when building
//! reducer-driven state with Tidyboard.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (commands/events)
//! - `#[derive(State)]` - Generates revision accessors for snapshot structs
//!
//! # Example
//!
//! ```ignore
//! use tidyboard_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum BoardAction {
//!     #[command]
//!     CreateTodo { name: String },
//!
//!     #[event]
//!     SnapshotSaved { revision: u64 },
//! }
//!
//! assert!(BoardAction::CreateTodo { name: "test".into() }.is_command());
//! assert!(BoardAction::SnapshotSaved { revision: 1 }.is_event());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Variant};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a command (an intent)
/// - `is_event()` - Returns true if this variant is an event (a reported fact)
/// - `name()` - Returns the variant name, for logs and metric labels
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]` attributes
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut command_arms = Vec::new();
    let mut event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(variant, "Variant cannot be both #[command] and #[event]")
                .to_compile_error()
                .into();
        }

        let pattern = variant_pattern(variant);
        if is_command {
            command_arms.push(quote! { #pattern => true, });
        }
        if is_event {
            event_arms.push(quote! { #pattern => true, });
        }

        let variant_name = variant.ident.to_string();
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for snapshot State structs
///
/// Generates revision helpers for structs with a `u64` field marked
/// `#[revision]`:
/// - `revision()` - the current revision
/// - `bump_revision()` - increments and returns the new revision
///
/// Structs without a `#[revision]` field get no generated code.
///
/// # Errors
///
/// Produces a compile error if applied to a non-struct type.
///
/// # Example
///
/// ```ignore
/// use tidyboard_macros::State;
///
/// #[derive(State, Clone, Debug, Default)]
/// struct Board {
///     pub todos: Vec<String>,
///     #[revision]
///     revision: u64,
/// }
///
/// let mut board = Board::default();
/// assert_eq!(board.bump_revision(), 1);
/// ```
#[proc_macro_derive(State, attributes(revision))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let Some(field) = data_struct
        .fields
        .iter()
        .find(|field| has_attribute(&field.attrs, "revision"))
    else {
        return TokenStream::new();
    };

    let Some(field_name) = field.ident.as_ref() else {
        return syn::Error::new_spanned(field, "#[revision] requires a named field")
            .to_compile_error()
            .into();
    };

    let expanded = quote! {
        impl #name {
            /// Current revision of this snapshot
            #[must_use]
            pub const fn revision(&self) -> u64 {
                self.#field_name
            }

            /// Increment the revision, returning the new value
            pub const fn bump_revision(&mut self) -> u64 {
                self.#field_name += 1;
                self.#field_name
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern for a variant regardless of its field shape
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
