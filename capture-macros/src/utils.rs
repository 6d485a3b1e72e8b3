use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream};

/// 成员级 `#[capture(...)]` 配置
#[derive(Default)]
pub(crate) struct MemberAttrs {
    pub skip: bool,
    pub readonly: bool,
    pub flatten: bool,
    pub rename: Option<LitStr>,
}

impl MemberAttrs {
    /// 最终暴露的成员名：优先 rename，否则取去掉 `r#` 前缀的标识符
    pub fn member_name(&self, ident: &Ident) -> LitStr {
        match &self.rename {
            Some(lit) => lit.clone(),
            None => LitStr::new(&ident.unraw().to_string(), ident.span()),
        }
    }
}

// 拆出 #[capture(...)]，其余属性原样保留
pub(crate) fn take_member_attrs(attrs: &mut Vec<Attribute>) -> Result<MemberAttrs> {
    let mut cfg = MemberAttrs::default();
    let mut retained = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("capture") {
            retained.push(attr);
            continue;
        }
        let elems: Punctuated<MemberAttrElem, Token![,]> =
            attr.parse_args_with(Punctuated::<MemberAttrElem, Token![,]>::parse_terminated)?;
        for elem in elems {
            match elem {
                MemberAttrElem::Flag(key) => {
                    let slot = match key.to_string().as_str() {
                        "skip" => &mut cfg.skip,
                        "readonly" => &mut cfg.readonly,
                        "flatten" => &mut cfg.flatten,
                        _ => {
                            return Err(syn::Error::new(
                                key.span(),
                                "unknown key; expected 'skip' | 'readonly' | 'flatten' | 'rename'",
                            ));
                        }
                    };
                    if *slot {
                        return Err(syn::Error::new(
                            key.span(),
                            format!("duplicate key '{key}' in attribute"),
                        ));
                    }
                    *slot = true;
                }
                MemberAttrElem::Rename(lit) => {
                    if cfg.rename.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'rename' in attribute",
                        ));
                    }
                    cfg.rename = Some(lit);
                }
            }
        }
    }

    *attrs = retained;
    Ok(cfg)
}

enum MemberAttrElem {
    Flag(Ident),
    Rename(LitStr),
}

impl Parse for MemberAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        if key == "rename" {
            let _eq: Token![=] = input.parse()?;
            let expr: Expr = input.parse()?;
            match expr {
                Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }) => Ok(Self::Rename(lit)),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'rename'",
                )),
            }
        } else {
            Ok(Self::Flag(key))
        }
    }
}

/// 判断类型路径的最后一段是否为指定名称（如 `Result`、`Args`）
pub(crate) fn is_type_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|seg| seg.ident == name)
            .unwrap_or(false),
        Type::Group(g) => is_type_named(&g.elem, name),
        Type::Paren(p) => is_type_named(&p.elem, name),
        _ => false,
    }
}
