use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DataStruct, DeriveInput, Field, Fields, LitStr, Result, Type};

struct PropertyAttributes {
    id: bool,
    transient: bool,
    key: Option<String>,
}

fn parse_property_attributes(field: &Field) -> Result<PropertyAttributes> {
    let mut attributes = PropertyAttributes {
        id: false,
        transient: false,
        key: None,
    };

    for attr in &field.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    attributes.id = true;
                    Ok(())
                } else if meta.path.is_ident("transient") {
                    attributes.transient = true;
                    Ok(())
                } else if meta.path.is_ident("key") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    if s.value().is_empty() {
                        return Err(meta.error("Property key cannot be empty"));
                    }
                    attributes.key = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity property attribute"))
                }
            })?;
        }
    }

    if attributes.id && attributes.transient {
        return Err(syn::Error::new_spanned(field, "An identifier property cannot be transient"));
    }
    Ok(attributes)
}

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&ast.generics, "Generic entities are not supported"));
    }

    let mut entity_name = name.unraw().to_string();
    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?;
        }
    }

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "Only structs with named fields are supported",
            ))
        }
    };

    let mut idents: Vec<&Ident> = Vec::with_capacity(fields.len());
    let mut property_names: Vec<String> = Vec::with_capacity(fields.len());
    let mut types: Vec<&Type> = Vec::with_capacity(fields.len());
    let mut property_models = Vec::with_capacity(fields.len());
    let mut id_found = false;

    for field in &fields {
        let attributes = parse_property_attributes(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let property_name = ident.unraw().to_string();
        let ty = &field.ty;

        if attributes.id {
            if id_found {
                return Err(syn::Error::new_spanned(field, "Multiple id attributes are not allowed"));
            }
            id_found = true;
        }

        // transient fields are never mapped, so their type needs no conversion support
        let type_ref = if attributes.transient {
            quote! { docmap::common::TypeRef::Any }
        } else {
            quote! { <#ty as docmap::common::Convertible>::type_ref() }
        };
        let mut model = quote! {
            docmap::entity::PropertyModel::new(#property_name, #type_ref)
        };
        if let Some(key) = &attributes.key {
            model = quote! { #model.with_key(#key) };
        }
        if attributes.id {
            model = quote! { #model.as_id() };
        }
        if attributes.transient {
            model = quote! { #model.as_transient() };
        }

        property_models.push(model);
        if !attributes.transient {
            idents.push(ident);
            property_names.push(property_name);
            types.push(ty);
        }
    }

    let gen = quote! {
        impl docmap::entity::Entity for #name {
            fn entity_type(&self) -> docmap::entity::EntityType {
                docmap::entity::EntityType::of::<#name>()
            }

            fn property(&self, name: &str) -> docmap::errors::MapperResult<docmap::common::Value> {
                match name {
                    #(#property_names => docmap::common::Convertible::to_value(&self.#idents),)*
                    _ => docmap::entity::unknown_property(self, name),
                }
            }

            #[allow(unreachable_code, unused_variables)]
            fn set_property(
                &mut self,
                name: &str,
                value: docmap::common::Value,
            ) -> docmap::errors::MapperResult<()> {
                match name {
                    #(#property_names => {
                        self.#idents = <#types as docmap::common::Convertible>::from_value(&value)?;
                    })*
                    _ => return docmap::entity::unknown_property(self, name),
                }
                Ok(())
            }

            fn clone_entity(&self) -> Box<dyn docmap::entity::Entity> {
                Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
                self
            }
        }

        impl docmap::entity::MappedEntity for #name {
            fn entity_model() -> docmap::entity::EntityModel {
                docmap::entity::EntityModel::new(#entity_name)
                    #(.property(#property_models))*
            }
        }

        impl docmap::common::Convertible for #name {
            fn type_ref() -> docmap::common::TypeRef {
                docmap::common::TypeRef::Entity(docmap::entity::EntityType::of::<#name>())
            }

            fn to_value(&self) -> docmap::errors::MapperResult<docmap::common::Value> {
                Ok(docmap::entity::entity_to_value(self))
            }

            fn from_value(value: &docmap::common::Value) -> docmap::errors::MapperResult<Self> {
                docmap::entity::entity_from_value(value)
            }
        }
    };

    Ok(TokenStream::from(gen))
}
