use crate::utils::take_member_attrs;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Ident, Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[capturable] 宏实现
/// - 仅支持具名字段结构体
/// - 为结构体实现 `::capture_core::target::Target`：字段即数据成员
/// - 字段属性：`#[capture(skip)]` 隐藏、`#[capture(readonly)]` 只读、
///   `#[capture(rename = "...")]` 改名、`#[capture(flatten)]` 作为基对象继承其成员
/// - 参数：`#[capturable(methods)]` 时可调用成员委托给 `MethodTable`（由 `#[capturable_methods]` 生成）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as CapturableAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[capturable] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let mut data_fields: Vec<(Ident, syn::LitStr, bool)> = Vec::new();
    let mut bases: Vec<Ident> = Vec::new();

    for field in fields_named.named.iter_mut() {
        let member = match take_member_attrs(&mut field.attrs) {
            Ok(m) => m,
            Err(err) => return err.to_compile_error().into(),
        };
        // 具名字段一定有标识符
        let Some(ident) = field.ident.clone() else {
            continue;
        };

        if member.flatten {
            if member.readonly || member.rename.is_some() || member.skip {
                return syn::Error::new(
                    ident.span(),
                    "'flatten' cannot be combined with other keys",
                )
                .to_compile_error()
                .into();
            }
            bases.push(ident);
            continue;
        }
        if member.skip {
            continue;
        }
        let name = member.member_name(&ident);
        data_fields.push((ident, name, !member.readonly));
    }

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let descriptor_items = data_fields.iter().map(|(_, name, writable)| {
        quote! {
            ::capture_core::member::MemberDescriptor::new(
                #name,
                ::capture_core::member::MemberKind::Data { writable: #writable },
            )
        }
    });

    let get_arms = data_fields.iter().map(|(field, name, _)| {
        quote! { #name => return ::capture_core::value::to_value(name, &self.#field), }
    });

    let set_arms = data_fields.iter().map(|(field, name, writable)| {
        if *writable {
            quote! {
                #name => {
                    self.#field = ::capture_core::value::from_value(name, value.clone())?;
                    return ::std::result::Result::Ok(value);
                }
            }
        } else {
            quote! {
                #name => {
                    return ::std::result::Result::Err(
                        ::capture_core::error::CaptureError::ReadOnly { member: name.to_string() },
                    );
                }
            }
        }
    });

    let field_names: Vec<_> = data_fields.iter().map(|(_, name, _)| name).collect();

    let (method_descriptors, method_guard_data, method_dispatch) = if cfg.methods {
        (
            quote! {
                own.extend(
                    <Self as ::capture_core::target::MethodTable>::method_names()
                        .iter()
                        .map(|n| ::capture_core::member::MemberDescriptor::method(*n)),
                );
            },
            quote! {
                if <Self as ::capture_core::target::MethodTable>::method_names().contains(&name) {
                    return ::std::result::Result::Err(
                        ::capture_core::error::CaptureError::NotData { member: name.to_string() },
                    );
                }
            },
            quote! {
                if <Self as ::capture_core::target::MethodTable>::method_names().contains(&name) {
                    return ::capture_core::target::MethodTable::call_method(self, name, args);
                }
            },
        )
    } else {
        (quote! {}, quote! {}, quote! {})
    };

    let expanded = quote! {
        #st

        impl #impl_generics ::capture_core::target::Target for #ident #ty_generics #where_clause {
            fn members(&self) -> ::std::vec::Vec<::capture_core::member::MemberDescriptor> {
                #[allow(unused_mut)]
                let mut own: ::std::vec::Vec<::capture_core::member::MemberDescriptor> =
                    ::std::vec![ #( #descriptor_items ),* ];
                #method_descriptors
                #( let own = ::capture_core::member::merge_inherited(
                    own,
                    ::capture_core::target::Target::members(&self.#bases),
                ); )*
                own
            }

            fn get(&self, name: &str) -> ::capture_core::error::CaptureResult<::capture_core::value::Value> {
                match name {
                    #( #get_arms )*
                    _ => {}
                }
                #method_guard_data
                #( match ::capture_core::target::Target::get(&self.#bases, name) {
                    ::std::result::Result::Err(::capture_core::error::CaptureError::UnknownMember { .. }) => {}
                    other => return other,
                } )*
                ::std::result::Result::Err(::capture_core::error::CaptureError::unknown_member(name))
            }

            fn set(
                &mut self,
                name: &str,
                value: ::capture_core::value::Value,
            ) -> ::capture_core::error::CaptureResult<::capture_core::value::Value> {
                match name {
                    #( #set_arms )*
                    _ => {}
                }
                #method_guard_data
                #( match ::capture_core::target::Target::set(&mut self.#bases, name, value.clone()) {
                    ::std::result::Result::Err(::capture_core::error::CaptureError::UnknownMember { .. }) => {}
                    other => return other,
                } )*
                let _ = value;
                ::std::result::Result::Err(::capture_core::error::CaptureError::unknown_member(name))
            }

            fn call(
                &mut self,
                name: &str,
                args: ::capture_core::value::Args,
            ) -> ::capture_core::error::CaptureResult<::capture_core::value::Value> {
                #method_dispatch
                if [#( #field_names ),*].contains(&name) {
                    return ::std::result::Result::Err(
                        ::capture_core::error::CaptureError::not_callable(name),
                    );
                }
                #( match ::capture_core::target::Target::call(&mut self.#bases, name, args.clone()) {
                    ::std::result::Result::Err(::capture_core::error::CaptureError::UnknownMember { .. }) => {}
                    other => return other,
                } )*
                let _ = args;
                ::std::result::Result::Err(::capture_core::error::CaptureError::unknown_member(name))
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct CapturableAttrConfig {
    methods: bool,
}

impl Parse for CapturableAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut methods = false;

        if input.is_empty() {
            return Ok(Self { methods });
        }

        let keys: Punctuated<Ident, Token![,]> =
            Punctuated::<Ident, Token![,]>::parse_terminated(input)?;

        for key in keys {
            if key == "methods" {
                if methods {
                    return Err(syn::Error::new(
                        key.span(),
                        "duplicate key 'methods' in attribute",
                    ));
                }
                methods = true;
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    "unknown key in attribute; expected 'methods'",
                ));
            }
        }

        Ok(Self { methods })
    }
}
