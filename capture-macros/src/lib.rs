mod capturable;
mod methods;
mod utils;

use proc_macro::TokenStream;

/// 可捕获结构体宏
/// - 为具名字段结构体实现 `::capture_core::target::Target`，字段作为数据成员
/// - 字段属性：`#[capture(skip | readonly | flatten | rename = "...")]`
/// - 支持参数：`#[capturable(methods)]`，可调用成员取自 `#[capturable_methods]` 生成的方法表
#[proc_macro_attribute]
pub fn capturable(attr: TokenStream, item: TokenStream) -> TokenStream {
    capturable::expand(attr, item)
}

/// 可捕获方法宏
/// - 用于固有 impl 块，为其中的 `pub fn`（`&self`/`&mut self`）生成 `::capture_core::target::MethodTable`
/// - 方法属性：`#[capture(skip | rename = "...")]`
#[proc_macro_attribute]
pub fn capturable_methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    methods::expand(attr, item)
}
