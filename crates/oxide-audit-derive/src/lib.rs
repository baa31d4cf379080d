//! Derive macro for audit descriptors.
//!
//! This crate provides the `#[derive(Auditable)]` macro, which implements
//! `oxide_audit_core::Auditable` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Type};

/// Derives `Auditable` for a struct.
///
/// # Attributes
///
/// - `#[audit(name = "TypeName")]` - Overrides the record type name
///   (optional, defaults to the struct name)
/// - `#[audit(computed = "method")]` - Exposes `self.method()` as a
///   read-only property to update diffs (repeatable). The return type must
///   implement `AuditValue`.
///
/// # Field Attributes
///
/// - `#[audit(label = "Label")]` - Display label of the field
/// - `#[audit(skip)]` - Hides the field from every diff
/// - `#[audit(base)]` - Marks an embedded base record implementing
///   `Auditable`. Its properties are visible to update diffs but it
///   contributes no own fields.
/// - `#[audit(opaque)]` - Field type without an `AuditValue` impl; it is
///   read through its `Debug` output and never compared on insert
///
/// # Generated Items
///
/// For a struct `User`, this macro generates `impl Auditable for User` with:
///
/// - `TYPE_NAME`
/// - `own_fields()` listing every non-skipped, non-base field with its kind
/// - `properties()` listing own fields, then base properties, then computed
///   properties. A base property named like an own field is shadowed by it
///   and listed once. A computed property may not share an own field's name.
/// - `read()` dispatching on the property name
/// - `labels()` combining own and base labels
#[proc_macro_derive(Auditable, attributes(audit))]
pub fn derive_auditable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_auditable_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// How a field takes part in diffs.
enum FieldRole {
    /// Read through `AuditValue`.
    Own,
    /// Read through `Debug`.
    Opaque,
    /// Embedded base record.
    Base,
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    name: String,
    label: Option<String>,
    role: FieldRole,
}

#[derive(Default)]
struct FieldAttrs {
    label: Option<String>,
    skip: bool,
    base: bool,
    opaque: bool,
}

struct ContainerAttrs {
    name: String,
    computed: Vec<Ident>,
}

fn derive_auditable_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Auditable derive does not support generic structs",
        ));
    }

    let container = parse_container_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Auditable derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Auditable derive only supports structs",
            ));
        }
    };

    // Collect field information
    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let role = match (attrs.base, attrs.opaque) {
            (true, true) => {
                return Err(syn::Error::new_spanned(
                    field,
                    "a field cannot be both `base` and `opaque`",
                ));
            }
            (true, false) => {
                if attrs.label.is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "a `base` field cannot carry a label; label the base record's fields instead",
                    ));
                }
                FieldRole::Base
            }
            (false, true) => FieldRole::Opaque,
            (false, false) => FieldRole::Own,
        };

        field_infos.push(FieldInfo {
            name: ident.unraw().to_string(),
            ident,
            ty: field.ty.clone(),
            label: attrs.label,
            role,
        });
    }

    let type_name = &container.name;
    let own: Vec<&FieldInfo> = field_infos
        .iter()
        .filter(|f| !matches!(f.role, FieldRole::Base))
        .collect();
    let bases: Vec<&FieldInfo> = field_infos
        .iter()
        .filter(|f| matches!(f.role, FieldRole::Base))
        .collect();

    // Field definitions, in declaration order
    let field_defs: Vec<TokenStream2> = own
        .iter()
        .map(|info| {
            let name = &info.name;
            let ty = &info.ty;
            let kind = match info.role {
                FieldRole::Opaque => quote! { ::oxide_audit_core::ValueKind::Unsupported },
                _ => quote! { <#ty as ::oxide_audit_core::AuditValue>::KIND },
            };
            match &info.label {
                Some(label) => quote! {
                    ::oxide_audit_core::FieldDef::new(#name, #kind).with_label(#label)
                },
                None => quote! {
                    ::oxide_audit_core::FieldDef::new(#name, #kind)
                },
            }
        })
        .collect();

    let own_names: Vec<&str> = own.iter().map(|f| f.name.as_str()).collect();
    let base_types: Vec<&Type> = bases.iter().map(|f| &f.ty).collect();
    let base_idents: Vec<&Ident> = bases.iter().map(|f| &f.ident).collect();
    let computed_idents = &container.computed;
    let computed_names: Vec<String> = computed_idents
        .iter()
        .map(|c| c.unraw().to_string())
        .collect();

    for (i, computed) in computed_names.iter().enumerate() {
        if own_names.contains(&computed.as_str()) || computed_names[..i].contains(computed) {
            return Err(syn::Error::new_spanned(
                &computed_idents[i],
                format!("computed property `{computed}` collides with another property"),
            ));
        }
    }

    let own_arms: Vec<TokenStream2> = own
        .iter()
        .map(|info| {
            let name = &info.name;
            let ident = &info.ident;
            match info.role {
                FieldRole::Opaque if is_option(&info.ty) => quote! {
                    #name => ::core::result::Result::Ok(match &self.#ident {
                        ::core::option::Option::Some(value) => {
                            ::oxide_audit_core::FieldValue::Opaque(::std::format!("{:?}", value))
                        }
                        ::core::option::Option::None => ::oxide_audit_core::FieldValue::Null,
                    }),
                },
                FieldRole::Opaque => quote! {
                    #name => ::core::result::Result::Ok(
                        ::oxide_audit_core::FieldValue::Opaque(::std::format!("{:?}", self.#ident))
                    ),
                },
                _ => quote! {
                    #name => ::core::result::Result::Ok(
                        ::oxide_audit_core::AuditValue::to_field_value(&self.#ident)
                    ),
                },
            }
        })
        .collect();

    let labelled: Vec<(&str, &str)> = own
        .iter()
        .filter_map(|f| f.label.as_deref().map(|l| (f.name.as_str(), l)))
        .collect();
    let label_names: Vec<&str> = labelled.iter().map(|(n, _)| *n).collect();
    let label_values: Vec<&str> = labelled.iter().map(|(_, l)| *l).collect();

    let expanded = quote! {
        impl ::oxide_audit_core::Auditable for #struct_name {
            const TYPE_NAME: &'static str = #type_name;

            fn own_fields() -> &'static [::oxide_audit_core::FieldDef] {
                const FIELDS: &[::oxide_audit_core::FieldDef] = &[#(#field_defs),*];
                FIELDS
            }

            fn properties() -> ::std::vec::Vec<&'static str> {
                #[allow(unused_mut)]
                let mut properties: ::std::vec::Vec<&'static str> = ::std::vec::Vec::new();
                #(properties.push(#own_names);)*
                #(
                    for name in <#base_types as ::oxide_audit_core::Auditable>::properties() {
                        if !properties.contains(&name) {
                            properties.push(name);
                        }
                    }
                )*
                #(
                    if !properties.contains(&#computed_names) {
                        properties.push(#computed_names);
                    }
                )*
                properties
            }

            fn read(
                &self,
                field: &str,
            ) -> ::core::result::Result<
                ::oxide_audit_core::FieldValue,
                ::oxide_audit_core::AccessError,
            > {
                match field {
                    #(#own_arms)*
                    #(
                        #computed_names => ::core::result::Result::Ok(
                            ::oxide_audit_core::AuditValue::to_field_value(&self.#computed_idents())
                        ),
                    )*
                    _ => {
                        #(
                            match ::oxide_audit_core::Auditable::read(&self.#base_idents, field) {
                                ::core::result::Result::Err(
                                    ::oxide_audit_core::AccessError::UnknownField { .. }
                                ) => {}
                                other => return other,
                            }
                        )*
                        ::core::result::Result::Err(::oxide_audit_core::AccessError::UnknownField {
                            type_name: #type_name,
                            field: ::std::borrow::ToOwned::to_owned(field),
                        })
                    }
                }
            }

            fn labels() -> ::std::vec::Vec<(&'static str, &'static str)> {
                #[allow(dead_code)]
                const OWN: &[&str] = &[#(#own_names),*];
                #[allow(unused_mut)]
                let mut labels: ::std::vec::Vec<(&'static str, &'static str)> =
                    ::std::vec::Vec::new();
                #(labels.push((#label_names, #label_values));)*
                #(
                    for (name, label) in <#base_types as ::oxide_audit_core::Auditable>::labels() {
                        if !OWN.contains(&name)
                            && !labels.iter().any(|(labelled, _)| *labelled == name)
                        {
                            labels.push((name, label));
                        }
                    }
                )*
                labels
            }
        }
    };

    Ok(expanded)
}

fn parse_container_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs {
        name: struct_name.unraw().to_string(),
        computed: Vec::new(),
    };

    for attr in attrs {
        if !attr.path().is_ident("audit") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.name = value.value();
            } else if meta.path.is_ident("computed") {
                let value: LitStr = meta.value()?.parse()?;
                result.computed.push(value.parse()?);
            } else {
                return Err(meta.error("unsupported audit attribute; expected `name` or `computed`"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("audit") {
            continue;
        }
        // Handle empty attribute like #[audit]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("base") {
                result.base = true;
            } else if meta.path.is_ident("opaque") {
                result.opaque = true;
            } else if meta.path.is_ident("label") {
                let value: LitStr = meta.value()?.parse()?;
                result.label = Some(value.value());
            } else {
                return Err(meta.error(
                    "unsupported audit attribute; expected `label`, `skip`, `base` or `opaque`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Returns true if `ty` is spelled `Option<_>`.
fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path.path.segments.last().is_some_and(|segment| {
            segment.ident == "Option"
                && matches!(segment.arguments, syn::PathArguments::AngleBracketed(_))
        })
}
