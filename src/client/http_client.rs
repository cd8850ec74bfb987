use std::net::IpAddr;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::ApiConfig;

const NO_PROXY_ENV: &str = "LOGVIEW_NO_PROXY";

fn has_proxy_env() -> bool {
    [
        "HTTPS_PROXY",
        "https_proxy",
        "HTTP_PROXY",
        "http_proxy",
        "ALL_PROXY",
        "all_proxy",
    ]
    .iter()
    .any(|k| std::env::var(k).is_ok_and(|v| !v.trim().is_empty()))
}

fn truthy(v: &str) -> bool {
    matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

// 日志后端通常部署在内网：loopback / 私有地址不走代理
fn should_bypass_proxy_impl(url: &str, proxy_env_present: bool, forced: bool) -> bool {
    if !proxy_env_present {
        return false;
    }
    if forced {
        return true;
    }

    let Ok(u) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = u.host_str() else {
        return false;
    };
    match host.trim_matches(['[', ']']).parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private(),
        Ok(IpAddr::V6(ip)) => ip.is_loopback(),
        Err(_) => host == "localhost" || host.ends_with(".local"),
    }
}

pub fn should_bypass_proxy_for_url(url: &str) -> bool {
    let forced = std::env::var(NO_PROXY_ENV).is_ok_and(|v| truthy(&v));
    should_bypass_proxy_impl(url, has_proxy_env(), forced)
}

pub fn maybe_disable_proxy(builder: ClientBuilder, url: &str) -> ClientBuilder {
    if should_bypass_proxy_for_url(url) {
        tracing::debug!(url, "bypassing proxy for log backend");
        builder.no_proxy()
    } else {
        builder
    }
}

pub fn client_for_api(cfg: &ApiConfig) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder().timeout(Duration::from_secs(cfg.timeout_secs));
    maybe_disable_proxy(builder, &cfg.base_url).build()
}

#[cfg(test)]
mod tests {
    use super::should_bypass_proxy_impl;

    #[test]
    fn bypass_proxy_for_local_backends() {
        assert!(should_bypass_proxy_impl("http://127.0.0.1:8000/api", true, false));
        assert!(should_bypass_proxy_impl("http://10.1.2.3/api", true, false));
        assert!(should_bypass_proxy_impl("http://localhost:5000", true, false));
        assert!(!should_bypass_proxy_impl("https://logs.example.com", true, false));
    }

    #[test]
    fn forced_bypass_and_no_proxy_env() {
        assert!(should_bypass_proxy_impl("https://logs.example.com", true, true));
        assert!(!should_bypass_proxy_impl("http://127.0.0.1:8000", false, true));
    }
}
