//! Record derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, Result};

/// Built-in cast names accepted in `casts(...)`.
const CAST_NAMES: &[&str] = &[
    "int", "integer", "float", "number", "boolean", "bool", "datetime",
];

enum CastSpec {
    Named(LitStr),
    Custom {
        cast: Option<Path>,
        decast: Option<Path>,
    },
}

struct RecordAttrs {
    table: Option<String>,
    casts: Option<Vec<(String, CastSpec)>>,
}

fn parse_struct_attrs(input: &DeriveInput) -> Result<RecordAttrs> {
    let mut attrs = RecordAttrs {
        table: None,
        casts: None,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.table = Some(lit.value());
                return Ok(());
            }
            if meta.path.is_ident("casts") {
                let casts = attrs.casts.get_or_insert_with(Vec::new);
                meta.parse_nested_meta(|column| {
                    let name = column
                        .path
                        .get_ident()
                        .map(|i| i.to_string())
                        .ok_or_else(|| column.error("expected a column name"))?;
                    if column.input.peek(syn::Token![=]) {
                        let lit: LitStr = column.value()?.parse()?;
                        if !CAST_NAMES.contains(&lit.value().to_lowercase().as_str()) {
                            return Err(syn::Error::new_spanned(
                                &lit,
                                format!(
                                    "unknown cast '{}', expected one of: {}",
                                    lit.value(),
                                    CAST_NAMES.join(", ")
                                ),
                            ));
                        }
                        casts.push((name, CastSpec::Named(lit)));
                        return Ok(());
                    }
                    let mut cast = None;
                    let mut decast = None;
                    column.parse_nested_meta(|direction| {
                        if direction.path.is_ident("cast") {
                            cast = Some(direction.value()?.parse::<Path>()?);
                            Ok(())
                        } else if direction.path.is_ident("decast") {
                            decast = Some(direction.value()?.parse::<Path>()?);
                            Ok(())
                        } else {
                            Err(direction.error("expected `cast` or `decast`"))
                        }
                    })?;
                    casts.push((name, CastSpec::Custom { cast, decast }));
                    Ok(())
                })?;
                return Ok(());
            }
            Err(meta.error("unsupported record attribute, expected `table` or `casts`"))
        })?;
    }

    Ok(attrs)
}

fn is_attributes_field(field: &syn::Field) -> bool {
    let marked = field.attrs.iter().any(|attr| {
        attr.path().is_ident("record")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "attributes")
    });
    if marked {
        return true;
    }
    match &field.ty {
        syn::Type::Path(ty) => ty
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Attributes"),
        _ => false,
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let attrs = parse_struct_attrs(&input)?;
    let table = attrs
        .table
        .unwrap_or_else(|| name.to_string().to_snake_case());

    let store: Vec<&syn::Field> = fields.iter().filter(|f| is_attributes_field(f)).collect();
    let store_ident = match store.as_slice() {
        [field] => field.ident.clone(),
        [] => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record requires a field of type `Attributes` (or marked `#[record(attributes)]`)",
            ));
        }
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                second,
                "Record allows only one `Attributes` field",
            ));
        }
    };

    let field_inits = fields.iter().map(|field| {
        let ident = &field.ident;
        if *ident == store_ident {
            quote! { #ident: attributes }
        } else {
            quote! { #ident: ::core::default::Default::default() }
        }
    });

    let casts_const = attrs.casts.map(|casts| {
        let rules = casts.iter().map(|(column, spec)| match spec {
            CastSpec::Named(kind) => quote! {
                (#column, ::recordq::CastRule::Named(#kind))
            },
            CastSpec::Custom { cast, decast } => {
                let cast = match cast {
                    Some(path) => quote! { ::core::option::Option::Some(#path) },
                    None => quote! { ::core::option::Option::None },
                };
                let decast = match decast {
                    Some(path) => quote! { ::core::option::Option::Some(#path) },
                    None => quote! { ::core::option::Option::None },
                };
                quote! {
                    (#column, ::recordq::CastRule::Custom { cast: #cast, decast: #decast })
                }
            }
        });
        quote! {
            const CASTS: ::recordq::Casts = ::recordq::Casts::new(&[#(#rules),*]);
        }
    });

    Ok(quote! {
        impl #impl_generics ::recordq::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: ::recordq::Row) -> ::recordq::OrmResult<Self> {
                ::core::result::Result::Ok(<Self as ::recordq::Record>::from_attributes(
                    ::recordq::Attributes::from(row),
                ))
            }
        }

        impl #impl_generics ::recordq::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;
            #casts_const

            fn from_attributes(attributes: ::recordq::Attributes) -> Self {
                Self {
                    #(#field_inits),*
                }
            }

            fn attributes(&self) -> &::recordq::Attributes {
                &self.#store_ident
            }

            fn attributes_mut(&mut self) -> &mut ::recordq::Attributes {
                &mut self.#store_ident
            }
        }
    })
}
