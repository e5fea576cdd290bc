use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DataEnum, DeriveInput, Fields, Result};

pub(crate) fn generate_mapped_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&ast.generics, "Generic enums are not supported"));
    }

    let enum_name = name.unraw().to_string();
    let mut variant_idents = Vec::with_capacity(data.variants.len());
    let mut variant_names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(variant, "Variants cannot carry data"));
        }
        variant_idents.push(&variant.ident);
        variant_names.push(variant.ident.unraw().to_string());
    }
    if variant_idents.is_empty() {
        return Err(syn::Error::new_spanned(ast, "Enums without variants are not supported"));
    }
    let ordinals: Vec<usize> = (0..variant_idents.len()).collect();
    let expected = format!("a constant of {}", enum_name);

    let gen = quote! {
        impl #name {
            /// Constants of this enum as the mapper sees them.
            pub fn enum_type() -> &'static docmap::common::EnumType {
                static ENUM_TYPE: docmap::common::EnumType =
                    docmap::common::EnumType::new(#enum_name, &[#(#variant_names),*]);
                &ENUM_TYPE
            }
        }

        impl docmap::common::Convertible for #name {
            fn type_ref() -> docmap::common::TypeRef {
                docmap::common::TypeRef::Enum(#name::enum_type())
            }

            fn to_value(&self) -> docmap::errors::MapperResult<docmap::common::Value> {
                let ordinal: usize = match self {
                    #(#name::#variant_idents => #ordinals,)*
                };
                match #name::enum_type().constant_at(ordinal) {
                    Some(constant) => Ok(docmap::common::Value::Enum(constant)),
                    None => docmap::common::mapping_error(&docmap::common::Value::Null, #expected),
                }
            }

            fn from_value(value: &docmap::common::Value) -> docmap::errors::MapperResult<Self> {
                let name = match value {
                    docmap::common::Value::Enum(constant) if constant.enum_type() == #name::enum_type() => {
                        constant.name()
                    }
                    docmap::common::Value::String(name) => name.as_str(),
                    _ => return docmap::common::mapping_error(value, #expected),
                };
                match name {
                    #(#variant_names => Ok(#name::#variant_idents),)*
                    _ => docmap::common::mapping_error(value, #expected),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
