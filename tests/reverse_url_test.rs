//! Reverse URL resolution against a live registry.

mod common;

use common::{dispatch, dummy_router};
use url_router::{Callback, ParamValues};

#[test]
fn test_find_url_by_handler_reference() {
    let mut router = dummy_router();
    router
        .get("/", Callback::parse("DummyController@method1"))
        .unwrap();
    router
        .get("/about", Callback::parse("DummyController@about"))
        .unwrap();

    dispatch(&mut router, "get", "/").unwrap();

    assert_eq!(router.url("DummyController@about").path(), "/about/");
    assert_eq!(router.url("DummyController@method1").path(), "/");

    // Unresolvable names degrade to a literal join.
    assert_eq!(router.url("/about").path(), "/about/");
    assert_eq!(router.url("/").path(), "/");
}

#[test]
fn test_current_url_equals_literal_lookup() {
    let mut router = dummy_router();
    router
        .get("/url11", Callback::parse("DummyController@method1"))
        .unwrap();
    router
        .get("/url22", Callback::parse("DummyController@method2"))
        .unwrap();
    router
        .get("/url33", Callback::parse("DummyController@method2"))
        .unwrap();

    dispatch(&mut router, "get", "/url22").unwrap();

    let current = router.get_url(None, &ParamValues::None, None);
    assert_eq!(current.path(), "/url22/");
    assert_eq!(router.url("/url22").path(), current.path());
}

#[test]
fn test_loaded_route_follows_each_dispatch() {
    let mut router = dummy_router();
    router
        .get("/aviso/legal", Callback::parse("DummyController@method1"))
        .unwrap();
    router
        .get("/aviso/{aviso}", Callback::parse("DummyController@method1"))
        .unwrap();
    router
        .get("/pagina/{pagina}", Callback::parse("DummyController@method1"))
        .unwrap();
    router
        .get("/{pagina?}", Callback::parse("DummyController@method1"))
        .unwrap();

    dispatch(&mut router, "get", "/aviso/optional").unwrap();
    assert_eq!(router.loaded_route().unwrap().pattern(), "/aviso/{aviso}/");

    dispatch(&mut router, "get", "/pagina/optional").unwrap();
    assert_eq!(router.loaded_route().unwrap().pattern(), "/pagina/{pagina}/");

    dispatch(&mut router, "get", "/optional").unwrap();
    assert_eq!(router.loaded_route().unwrap().pattern(), "/{pagina?}/");

    // A path that only misses the literal by one slash falls through to the
    // catch-all, not to the parametric aviso route.
    dispatch(&mut router, "get", "/avisolegal").unwrap();
    assert_ne!(router.loaded_route().unwrap().pattern(), "/aviso/{aviso}/");
    assert_eq!(router.loaded_route().unwrap().pattern(), "/{pagina?}/");
}

#[test]
fn test_reverse_generation_round_trip() {
    let mut router = dummy_router();
    router
        .get("/page/{id?}", Callback::parse("DummyController@param"))
        .unwrap()
        .set_name("page.show");

    dispatch(&mut router, "get", "/page/22").unwrap();
    assert_eq!(router.loaded_route().unwrap().pattern(), "/page/{id?}/");

    // No explicit parameters: the matched value fills the token.
    assert_eq!(router.url("page.show").path(), "/page/22/");

    // An explicitly empty parameter set yields the template form.
    let template = router.get_url(Some("page.show"), &ParamValues::Named(Vec::new()), None);
    assert_eq!(template.path(), "/page/{id?}/");

    // Explicit values win over the matched snapshot.
    let other = router.get_url(Some("page.show"), &ParamValues::named([("id", "7")]), None);
    assert_eq!(other.path(), "/page/7/");
}

#[test]
fn test_no_arguments_returns_current_url_with_query() {
    let mut router = dummy_router();
    router
        .get("/search", Callback::parse("DummyController@method1"))
        .unwrap();

    dispatch(&mut router, "get", "/search?q=rust").unwrap();

    let url = router.get_url(None, &ParamValues::None, None);
    assert_eq!(url.path(), "/search/");
    assert_eq!(url.param("q"), Some("rust"));
}

#[test]
fn test_explicit_query_parameters_are_attached() {
    let mut router = dummy_router();
    router
        .get("/page/{id?}", Callback::parse("DummyController@param"))
        .unwrap()
        .set_name("page.show");
    router.load_routes();

    let query = vec![("tab".to_string(), "history".to_string())];
    let url = router.get_url(
        Some("page.show"),
        &ParamValues::named([("id", "9")]),
        Some(query.as_slice()),
    );
    assert_eq!(url.to_string(), "/page/9/?tab=history");
}

#[test]
fn test_literal_fallback_joins_segments() {
    let mut router = dummy_router();
    router.load_routes();

    assert_eq!(
        router
            .get_url(Some("foo"), &ParamValues::single("bar"), None)
            .path(),
        "/foo/bar/"
    );
    assert_eq!(
        router
            .get_url(Some(""), &ParamValues::single(""), None)
            .path(),
        "/"
    );
}

#[test]
fn test_alias_with_method_suffix_resolves_alias() {
    let mut router = dummy_router();
    router
        .get("/users/{id}", Callback::parse("DummyController@param"))
        .unwrap()
        .set_name("user");
    router.load_routes();

    let url = router.get_url(Some("user@show"), &ParamValues::named([("id", "3")]), None);
    assert_eq!(url.path(), "/users/3/");
}
