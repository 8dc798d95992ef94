//! `#[test]` for the frozen crates: the test returns `eyre::Result<()>` and
//! runs `frozen_testhelpers::setup()` first.

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    /// `<attrs/qualifiers> fn name <params> { body }`
    struct TestFn {
        qualifiers: Any<Cons<Except<KFn>, TokenTree>>,
        _fn: KFn,
        name: Ident,
        params: Any<Cons<Except<BraceGroup>, TokenTree>>,
        body: BraceGroup,
    }
}

/// Marks a test that may use `?`. Logging and backtraces are set up before
/// the body runs.
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let Ok(test_fn) = item.to_token_iter().parse::<TestFn>() else {
        return quote::quote! {
            ::core::compile_error!("#[frozen_testhelpers::test] expects a function");
        }
        .into();
    };

    let qualifiers = test_fn.qualifiers.to_token_stream();
    let name = test_fn.name;
    let params = test_fn.params.to_token_stream();
    let body = test_fn.body.0.stream();

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #qualifiers fn #name #params -> ::frozen_testhelpers::eyre::Result<()> {
            ::frozen_testhelpers::setup();

            #body

            Ok(())
        }
    }
    .into()
}
