use url_pattern_ex::{ErrorKind, QueryItem, UrlParts};

type Result<T> = std::result::Result<T, url_pattern_ex::Error>;

#[test]
fn parse_relative() -> Result<()> {
    check_parse("", UrlParts::default())?;
    check_parse(
        "path",
        UrlParts {
            segments: vec!["path".into()],
            ..Default::default()
        },
    )?;
    check_parse(
        "/a/b",
        UrlParts {
            segments: vec!["".into(), "a".into(), "b".into()],
            ..Default::default()
        },
    )?;
    // verbatim: no percent-decoding
    check_parse(
        "/a%20b",
        UrlParts {
            segments: vec!["".into(), "a%20b".into()],
            ..Default::default()
        },
    )?;
    Ok(())
}

#[test]
fn parse_scheme_and_authority() -> Result<()> {
    check_parse(
        "s://h",
        UrlParts {
            scheme: Some("s".into()),
            host: Some("h".into()),
            ..Default::default()
        },
    )?;
    check_parse(
        "s://",
        UrlParts {
            scheme: Some("s".into()),
            host: Some("".into()),
            ..Default::default()
        },
    )?;
    check_parse(
        "s://u:p@h:80/x",
        UrlParts {
            scheme: Some("s".into()),
            user: Some("u".into()),
            password: Some("p".into()),
            host: Some("h".into()),
            port: Some(80),
            segments: vec!["".into(), "x".into()],
            ..Default::default()
        },
    )?;
    check_parse(
        "//h/x",
        UrlParts {
            host: Some("h".into()),
            segments: vec!["".into(), "x".into()],
            ..Default::default()
        },
    )?;
    check_parse(
        "s://[::1]:80/",
        UrlParts {
            scheme: Some("s".into()),
            host: Some("[::1]".into()),
            port: Some(80),
            segments: vec!["".into(), "".into()],
            ..Default::default()
        },
    )?;
    // a colon before the first slash with a valid prefix is a scheme
    check_parse(
        "a:b/c",
        UrlParts {
            scheme: Some("a".into()),
            segments: vec!["b".into(), "c".into()],
            ..Default::default()
        },
    )?;
    Ok(())
}

#[test]
fn parse_query_and_fragment() -> Result<()> {
    check_parse(
        "?",
        UrlParts {
            query: Some(vec![]),
            ..Default::default()
        },
    )?;
    check_parse(
        "?a=&b",
        UrlParts {
            query: Some(vec![QueryItem::new("a", Some("")), QueryItem::new("b", None)]),
            ..Default::default()
        },
    )?;
    check_parse(
        "#",
        UrlParts {
            fragment: Some("".into()),
            ..Default::default()
        },
    )?;
    check_parse(
        "path#f",
        UrlParts {
            segments: vec!["path".into()],
            fragment: Some("f".into()),
            ..Default::default()
        },
    )?;
    Ok(())
}

#[test]
fn parse_invalid_port() {
    for s in ["s://h:8x/", "s://h:99999999/"] {
        match UrlParts::parse(s) {
            Ok(parts) => panic!("expect error, url = `{s}`, got {parts:?}"),
            Err(e) => assert_eq!(e.kind(), &ErrorKind::InvalidUrl, "url = `{s}`"),
        }
    }
}

#[test]
fn compose_rejects_separators() {
    let parts = UrlParts {
        segments: vec!["a/b".into()],
        ..Default::default()
    };
    assert_eq!(parts.compose().unwrap_err().kind(), &ErrorKind::InvalidUrl);
    let parts = UrlParts {
        query: Some(vec![QueryItem::new("a", Some("b&c"))]),
        ..Default::default()
    };
    assert_eq!(parts.compose().unwrap_err().kind(), &ErrorKind::InvalidUrl);
    let parts = UrlParts {
        fragment: Some("f#g".into()),
        ..Default::default()
    };
    assert_eq!(parts.compose().unwrap_err().kind(), &ErrorKind::InvalidUrl);
}

#[test]
fn compose_rejects_ambiguous_structure() {
    // rootless path after an authority
    let parts = UrlParts {
        host: Some("h".into()),
        segments: vec!["x".into()],
        ..Default::default()
    };
    assert_eq!(parts.compose().unwrap_err().kind(), &ErrorKind::InvalidUrl);
    // rootless `//…` path would read back as an authority
    let parts = UrlParts {
        segments: vec!["".into(), "".into(), "x".into()],
        ..Default::default()
    };
    assert_eq!(parts.compose().unwrap_err().kind(), &ErrorKind::InvalidUrl);
}

#[track_caller]
fn check_parse(s: &str, e: UrlParts) -> Result<()> {
    let a = UrlParts::parse(s)?;
    assert_eq!(a, e, "parse: `{s}`");
    assert_eq!(a.compose()?, s, "compose: `{s}`");
    Ok(())
}
