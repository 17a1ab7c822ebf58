//! Static exclusion list for search results: hosts that are never a
//! prospect's own website (social networks, job boards, marketplaces,
//! directories, reference sites).

use prospect_common::extract_host;

const EXCLUDED_HOSTS: &[&str] = &[
    // Social networks
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "youtube.com",
    "pinterest.com",
    "reddit.com",
    // Job boards
    "indeed.com",
    "glassdoor.com",
    "careers24.com",
    "pnet.co.za",
    "careerjunction.co.za",
    "jobmail.co.za",
    // Marketplaces and classifieds
    "amazon.com",
    "ebay.com",
    "alibaba.com",
    "takealot.com",
    "gumtree.co.za",
    "olx.co.za",
    // Directories and review aggregators
    "yelp.com",
    "yellowpages.com",
    "yellowpages.co.za",
    "brabys.com",
    "tripadvisor.com",
    "booking.com",
    // Reference and content platforms
    "wikipedia.org",
    "medium.com",
    "quora.com",
    "blogspot.com",
    "wordpress.com",
];

/// True when the URL's host is (or is a subdomain of) an excluded host.
pub fn is_excluded_host(url: &str) -> bool {
    let host = extract_host(url);
    if host.is_empty() {
        return true;
    }
    let host = host.strip_prefix("www.").unwrap_or(&host);
    EXCLUDED_HOSTS
        .iter()
        .any(|ex| host == *ex || host.ends_with(&format!(".{ex}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_and_job_hosts_are_excluded() {
        assert!(is_excluded_host("https://www.facebook.com/acme"));
        assert!(is_excluded_host("https://za.linkedin.com/company/acme"));
        assert!(is_excluded_host("https://www.indeed.com/cmp/acme"));
    }

    #[test]
    fn company_sites_pass() {
        assert!(!is_excluded_host("https://acme.co.za/about"));
        assert!(!is_excluded_host("https://www.acmedigital.com"));
    }

    #[test]
    fn lookalike_hosts_are_not_excluded() {
        // Suffix matching is on dot boundaries only.
        assert!(!is_excluded_host("https://notfacebook.community"));
        assert!(!is_excluded_host("https://xcompany.example"));
    }

    #[test]
    fn unparseable_urls_are_excluded() {
        assert!(is_excluded_host("://"));
    }
}
