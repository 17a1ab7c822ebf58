//! Pure extraction helpers: pull titles, descriptions, contact details,
//! social links and service listings out of raw HTML / readable text.

use regex::Regex;

use crate::{ContactSignals, SocialLinks};

/// `<title>` contents, falling back to `og:title`.
pub fn extract_title(html: &str) -> Option<String> {
    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex");
    if let Some(cap) = title_re.captures(html) {
        let t = decode_entities(cap[1].trim());
        if !t.is_empty() {
            return Some(t);
        }
    }
    meta_content(html, "og:title")
}

/// `meta name="description"`, falling back to `og:description`.
pub fn extract_description(html: &str) -> Option<String> {
    meta_named(html, "description").or_else(|| meta_content(html, "og:description"))
}

/// Best-effort company name: `og:site_name`, else the cleaned title.
pub fn extract_company_name(html: &str) -> Option<String> {
    if let Some(site) = meta_content(html, "og:site_name") {
        return Some(site);
    }
    extract_title(html).and_then(|t| clean_company_name(&t))
}

/// Strip search-listing noise from a page or result title to get at the
/// underlying business name: "Acme Web | Home" -> "Acme Web",
/// "Acme Studios (Pty) Ltd" -> "Acme Studios".
pub fn clean_company_name(title: &str) -> Option<String> {
    let mut name = title.trim();

    for sep in [" - ", " | ", " – ", " :: ", " » "] {
        if let Some(idx) = name.find(sep) {
            name = &name[..idx];
        }
    }

    let suffix_re = Regex::new(
        r"(?i)[\s,]*(\(pty\)\s*ltd|pty\s*ltd|ltd|llc|inc\.?|cc|plc|corp\.?|co\.)\s*$",
    )
    .expect("valid regex");
    let cleaned = suffix_re.replace(name, "").trim().to_string();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// First sentence of a snippet, for when the title yields nothing usable.
pub fn first_sentence(snippet: &str) -> Option<String> {
    let s = snippet
        .split(['.', '!', '?'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    Some(s.to_string())
}

pub fn extract_emails(text: &str) -> Vec<String> {
    let email_re =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    email_re
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|e| !e.ends_with(".png") && !e.ends_with(".jpg") && !e.ends_with(".svg"))
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

pub fn extract_phones(text: &str) -> Vec<String> {
    let phone_re =
        Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    phone_re
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| {
            let digits = p.chars().filter(char::is_ascii_digit).count();
            (9..=15).contains(&digits)
        })
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Line following an "Address:"-style label, if any.
pub fn extract_address(text: &str) -> Option<String> {
    let addr_re =
        Regex::new(r"(?im)^\s*(?:physical\s+|postal\s+)?address\s*[:\-]\s*(.{10,120})$")
            .expect("valid regex");
    addr_re
        .captures(text)
        .map(|cap| cap[1].trim().to_string())
}

/// First link found for each known social platform.
pub fn extract_social_links(html: &str) -> SocialLinks {
    let href_re = Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex");

    let mut links = SocialLinks::default();
    for cap in href_re.captures_iter(html) {
        let href = &cap[1];
        let lower = href.to_lowercase();
        if lower.contains("linkedin.com/") && links.linkedin.is_none() {
            links.linkedin = Some(href.to_string());
        } else if lower.contains("facebook.com/") && links.facebook.is_none() {
            links.facebook = Some(href.to_string());
        } else if lower.contains("instagram.com/") && links.instagram.is_none() {
            links.instagram = Some(href.to_string());
        } else if (lower.contains("twitter.com/") || lower.contains("//x.com/"))
            && links.twitter.is_none()
        {
            links.twitter = Some(href.to_string());
        } else if lower.contains("youtube.com/") && links.youtube.is_none() {
            links.youtube = Some(href.to_string());
        }
    }
    links
}

/// Bullet items under a "Services"-style heading in readable text
/// (markdown from the content transform). Capped at 10 entries.
pub fn extract_services(text: &str) -> Vec<String> {
    let mut services = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim().to_lowercase();
            in_section = heading.contains("service")
                || heading.contains("what we do")
                || heading.contains("what we offer");
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let item = item.trim();
            if !item.is_empty() && item.len() < 120 {
                services.push(item.to_string());
                if services.len() >= 10 {
                    break;
                }
            }
        }
    }
    services
}

/// Assemble contact signals from readable text.
pub fn extract_contact(text: &str) -> ContactSignals {
    ContactSignals {
        email: extract_emails(text).into_iter().next(),
        phone: extract_phones(text).into_iter().next(),
        address: extract_address(text),
    }
}

fn meta_named(html: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?is)<meta[^>]+name\s*=\s*["']{name}["'][^>]+content\s*=\s*["']([^"']+)["']"#
    ))
    .expect("valid regex");
    re.captures(html).map(|cap| decode_entities(cap[1].trim()))
}

fn meta_content(html: &str, property: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?is)<meta[^>]+property\s*=\s*["']{property}["'][^>]+content\s*=\s*["']([^"']+)["']"#
    ))
    .expect("valid regex");
    re.captures(html).map(|cap| decode_entities(cap[1].trim()))
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
