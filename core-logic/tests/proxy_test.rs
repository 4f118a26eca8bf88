use core_logic::{parse_proxy_line, ProxyConfig, ProxyManager};

#[test]
fn parses_bare_host_port() {
    let proxy = parse_proxy_line("10.0.0.1:8080").expect("proxy");
    assert_eq!(proxy.host, "10.0.0.1");
    assert_eq!(proxy.port, 8080);
    assert!(proxy.username.is_none());
    assert!(proxy.password.is_none());
    assert_eq!(proxy.url(), "http://10.0.0.1:8080");
}

#[test]
fn parses_authenticated_proxy() {
    let proxy = parse_proxy_line("10.0.0.1:8080:alice:s3cret").expect("proxy");
    assert_eq!(proxy.username.as_deref(), Some("alice"));
    assert_eq!(proxy.password.as_deref(), Some("s3cret"));
    assert!(proxy.has_auth());
}

#[test]
fn password_may_contain_delimiters() {
    // Only the first three colons are structural.
    let proxy = parse_proxy_line("10.0.0.1:8080:alice:pa:ss:wd").expect("proxy");
    assert_eq!(proxy.username.as_deref(), Some("alice"));
    assert_eq!(proxy.password.as_deref(), Some("pa:ss:wd"));
}

#[test]
fn rejects_malformed_lines() {
    assert!(parse_proxy_line("justahost").is_none());
    assert!(parse_proxy_line("host:notaport").is_none());
    assert!(parse_proxy_line(":8080").is_none());
    // A login without a password is not a usable credential pair.
    assert!(parse_proxy_line("10.0.0.1:8080:alice").is_none());
}

#[test]
fn loads_proxy_file_skipping_comments_and_bad_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("proxies.txt");
    std::fs::write(
        &path,
        "# corp proxies\n\n10.0.0.1:8080\nbroken-line\n10.0.0.2:3128:bob:pw\n",
    )
    .expect("write proxies");

    let manager = ProxyManager::load(path.to_str().unwrap()).expect("load");
    assert_eq!(manager.len(), 2);

    let selected = manager.select().expect("selection from non-empty pool");
    assert!(["10.0.0.1", "10.0.0.2"].contains(&selected.host.as_str()));
}

#[test]
fn missing_proxy_file_yields_empty_pool_and_sample() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("proxies.txt");

    let manager = ProxyManager::load(path.to_str().unwrap()).expect("load");
    assert!(manager.is_empty());
    assert!(manager.select().is_none());
    assert!(path.exists());
}

#[test]
fn builds_reqwest_proxy_handles() {
    let proxy = ProxyConfig {
        host: "10.0.0.1".to_string(),
        port: 8080,
        username: Some("alice".to_string()),
        password: Some("s3cret".to_string()),
    };

    assert!(ProxyManager::build_proxy(&proxy).is_ok());
}

#[test]
fn selection_is_uniform_over_the_pool() {
    let proxies: Vec<ProxyConfig> = (0..4)
        .map(|i| ProxyConfig {
            host: format!("10.0.0.{}", i),
            port: 8080,
            username: None,
            password: None,
        })
        .collect();
    let manager = ProxyManager::from_proxies(proxies);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(manager.select().expect("proxy").host.clone());
    }
    // With 200 draws over 4 proxies, every proxy shows up.
    assert_eq!(seen.len(), 4);
}
