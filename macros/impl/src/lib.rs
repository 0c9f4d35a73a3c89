//! Procedural macro implementations re-exported by `msgfmt-macros`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, AttributeArgs, Error, Ident, ItemFn, Lit, Meta, NestedMeta};

const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Extracts the log level from `#[test_traced("LEVEL")]` or `#[test_traced(level = "LEVEL")]`.
fn parse_level(args: AttributeArgs) -> Result<Ident, Error> {
    let mut level = None;
    for arg in args {
        let lit = match arg {
            NestedMeta::Lit(Lit::Str(lit)) => lit,
            NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("level") => match nv.lit {
                Lit::Str(lit) => lit,
                other => return Err(Error::new_spanned(other, "level must be a string")),
            },
            other => return Err(Error::new_spanned(other, "unexpected argument")),
        };
        if level.is_some() {
            return Err(Error::new_spanned(lit, "level specified more than once"));
        }
        let value = lit.value().to_uppercase();
        if !LEVELS.contains(&value.as_str()) {
            return Err(Error::new_spanned(
                lit,
                "level must be one of TRACE, DEBUG, INFO, WARN or ERROR",
            ));
        }
        level = Some(Ident::new(&value, Span::call_site()));
    }
    Ok(level.unwrap_or_else(|| Ident::new("DEBUG", Span::call_site())))
}

/// Run a test with a `tracing` subscriber that logs to the test harness at the given level
/// (`DEBUG` by default).
///
/// # Example
///
/// ```ignore
/// use msgfmt_macros::test_traced;
///
/// #[test_traced("INFO")]
/// fn test_resolve() {
///     tracing::info!("captured");
///     tracing::debug!("dropped");
/// }
/// ```
#[proc_macro_attribute]
pub fn test_traced(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input = parse_macro_input!(item as ItemFn);
    let level = match parse_level(args) {
        Ok(level) => level,
        Err(err) => return err.to_compile_error().into(),
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis #sig {
            let subscriber = ::msgfmt_macros::tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(::msgfmt_macros::tracing::Level::#level)
                .with_line_number(true)
                .finish();
            let dispatch = ::msgfmt_macros::tracing::Dispatch::new(subscriber);
            ::msgfmt_macros::tracing::dispatcher::with_default(&dispatch, || #block)
        }
    };
    TokenStream::from(expanded)
}
