use crate::utils::{is_type_named, take_member_attrs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ImplItemFn, Item, ReturnType, Type, Visibility, parse_macro_input};

/// #[capturable_methods] 宏实现
/// - 仅支持固有 impl 块（`impl Foo { .. }`）
/// - 为其中每个 `pub fn`（接收者为 `&self`/`&mut self`）生成按名分发，实现 `::capture_core::target::MethodTable`
/// - 参数按位置由 `Args` 解码（serde）；唯一参数类型为 `Args` 时原样转发（变长参数）
/// - 返回值序列化为 `Value`；返回 `Result<T, E>` 时 `Err` 映射为 `CaptureError::Invocation`
/// - 方法属性：`#[capture(skip)]` 不暴露、`#[capture(rename = "...")]` 改名
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[capturable_methods] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let input = parse_macro_input!(item as Item);

    let mut imp = match input {
        Item::Impl(i) if i.trait_.is_none() => i,
        other => {
            return syn::Error::new(
                other.span(),
                "#[capturable_methods] only on inherent impl blocks",
            )
            .to_compile_error()
            .into();
        }
    };

    let mut names = Vec::new();
    let mut arms = Vec::new();

    for impl_item in imp.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let member = match take_member_attrs(&mut method.attrs) {
            Ok(m) => m,
            Err(err) => return err.to_compile_error().into(),
        };
        if member.readonly || member.flatten {
            return syn::Error::new(
                method.sig.ident.span(),
                "only 'skip' and 'rename' apply to methods",
            )
            .to_compile_error()
            .into();
        }
        if member.skip || !matches!(method.vis, Visibility::Public(_)) {
            continue;
        }
        // 关联函数（无 self）不是成员
        let Some(receiver) = method.sig.receiver() else {
            continue;
        };
        if receiver.reference.is_none() {
            return syn::Error::new(
                receiver.span(),
                "capturable methods must take &self or &mut self",
            )
            .to_compile_error()
            .into();
        }

        let name = member.member_name(&method.sig.ident);
        match dispatch_arm(method, &name) {
            Ok(arm) => arms.push(arm),
            Err(err) => return err.to_compile_error().into(),
        }
        names.push(name);
    }

    let self_ty = &imp.self_ty;
    let (impl_generics, _, where_clause) = imp.generics.split_for_impl();

    let out = quote! {
        #imp

        impl #impl_generics ::capture_core::target::MethodTable for #self_ty #where_clause {
            fn method_names() -> &'static [&'static str] {
                &[ #( #names ),* ]
            }

            fn call_method(
                &mut self,
                name: &str,
                args: ::capture_core::value::Args,
            ) -> ::capture_core::error::CaptureResult<::capture_core::value::Value> {
                match name {
                    #( #arms )*
                    _ => {
                        let _ = args;
                        ::std::result::Result::Err(::capture_core::error::CaptureError::unknown_member(name))
                    }
                }
            }
        }
    };

    TokenStream::from(out)
}

fn dispatch_arm(method: &ImplItemFn, name: &syn::LitStr) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "generic methods are not capturable; mark with #[capture(skip)]",
        ));
    }
    if let Some(token) = &sig.asyncness {
        return Err(syn::Error::new(
            token.span(),
            "async methods are not capturable; mark with #[capture(skip)]",
        ));
    }

    let params: Vec<&Type> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pt) => Some(&*pt.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();

    for ty in &params {
        if let Type::Reference(r) = ty {
            return Err(syn::Error::new(
                r.span(),
                "capturable methods take owned arguments",
            ));
        }
    }

    let fn_ident = &sig.ident;
    let call = if params.len() == 1 && is_type_named(params[0], "Args") {
        // 变长参数：原样转发
        quote! { self.#fn_ident(args) }
    } else {
        let count = params.len();
        let locals: Vec<_> = (0..count).map(|i| format_ident!("__arg{}", i)).collect();
        let decodes = params.iter().enumerate().map(|(i, ty)| {
            let local = &locals[i];
            quote! { let #local: #ty = args.decode(name, #i)?; }
        });
        quote! {{
            if args.len() > #count {
                return ::std::result::Result::Err(::capture_core::error::CaptureError::ArgumentCount {
                    member: name.to_string(),
                    expected: #count,
                    found: args.len(),
                });
            }
            #( #decodes )*
            self.#fn_ident( #( #locals ),* )
        }}
    };

    let body = match &sig.output {
        ReturnType::Default => quote! {
            #call;
            ::std::result::Result::Ok(::capture_core::value::Value::Null)
        },
        ReturnType::Type(_, ty) if is_type_named(ty, "Result") => quote! {
            let out = #call.map_err(|e| ::capture_core::error::CaptureError::invocation(name, e))?;
            ::capture_core::value::to_value(name, out)
        },
        ReturnType::Type(..) => quote! {
            let out = #call;
            ::capture_core::value::to_value(name, out)
        },
    };

    Ok(quote! {
        #name => { #body }
    })
}
