// src/discovery.rs

//! Page discovery from a static-site build directory.
//!
//! Feeds the `submit-all` command: URLs are gathered from the generated
//! `sitemap.xml`, from a recursive scan for `index.html` files, and from a
//! fixed important-pages fallback, then merged, deduplicated, and ordered by
//! priority.

use std::fs;
use std::path::Path;

use regex::Regex;

/// Directories in the build output that never contain pages.
const SKIP_DIRS: [&str; 3] = ["_astro", "favicon", "api"];

/// Extract page URLs from `sitemap.xml` under `dist`, keeping only those
/// rooted at `site_url`.
pub fn sitemap_urls(dist: &Path, site_url: &str) -> Vec<String> {
    let sitemap = dist.join("sitemap.xml");
    let Ok(content) = fs::read_to_string(&sitemap) else {
        log::info!("No sitemap.xml at {}, skipping", sitemap.display());
        return Vec::new();
    };

    // Sitemaps are machine-generated; a <loc> scan is sufficient
    let loc = match Regex::new(r"<loc>(.*?)</loc>") {
        Ok(re) => re,
        Err(e) => {
            log::error!("Sitemap pattern failed to compile: {e}");
            return Vec::new();
        }
    };

    let urls: Vec<String> = loc
        .captures_iter(&content)
        .map(|c| c[1].trim().to_string())
        .filter(|url| url.starts_with(site_url))
        .collect();

    log::info!("Parsed {} URLs from sitemap.xml", urls.len());
    urls
}

/// Discover pages by scanning the build output for `index.html` files.
///
/// Prefers a `client/` subdirectory when present (SSR build layout); each
/// directory containing an `index.html` maps to a trailing-slash URL.
pub fn scan_pages(dist: &Path, site_url: &str) -> Vec<String> {
    let client_dir = dist.join("client");
    let base = if client_dir.is_dir() { client_dir } else { dist.to_path_buf() };

    let mut urls = Vec::new();
    scan_html_files(&base, &base, site_url, &mut urls);
    log::info!("Found {} pages in build directory", urls.len());
    urls
}

fn scan_html_files(dir: &Path, base: &Path, site_url: &str, urls: &mut Vec<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Failed to scan {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();

        if path.is_dir() {
            if !SKIP_DIRS.iter().any(|skip| name == *skip) {
                scan_html_files(&path, base, site_url, urls);
            }
        } else if name == "index.html" {
            let relative = dir.strip_prefix(base).unwrap_or(dir);
            let mut url = site_url.trim_end_matches('/').to_string();
            if relative.as_os_str().is_empty() {
                url.push('/');
            } else {
                for component in relative.components() {
                    url.push('/');
                    url.push_str(&component.as_os_str().to_string_lossy());
                }
                url.push('/');
            }
            urls.push(url);
        }
    }
}

/// Fixed fallback list of the site's important routes.
pub fn important_pages(site_url: &str) -> Vec<String> {
    let base = site_url.trim_end_matches('/');
    [
        "/", "/about/", "/friends/", "/archive/", "/gallery/", "/music/", "/music-admin/",
    ]
    .iter()
    .map(|path| format!("{base}{path}"))
    .collect()
}

/// Merge URL lists from all discovery sources, normalizing and
/// deduplicating with first-occurrence order.
///
/// URLs without a query or fragment are normalized to a trailing slash.
pub fn merge_and_dedupe(lists: &[Vec<String>]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();

    for list in lists {
        for url in list {
            let mut normalized = url.trim().to_string();
            if !normalized.ends_with('/')
                && !normalized.contains('?')
                && !normalized.contains('#')
            {
                normalized.push('/');
            }
            if seen.insert(normalized.clone()) {
                merged.push(normalized);
            }
        }
    }

    merged
}

/// Order URLs for submission: home, about, archive, friends first, the rest
/// alphabetical.
pub fn sort_by_priority(mut urls: Vec<String>, site_url: &str) -> Vec<String> {
    let base = site_url.trim_end_matches('/');
    let priority = |url: &str| -> u32 {
        if url == format!("{base}/") {
            1
        } else if url == format!("{base}/about/") {
            2
        } else if url == format!("{base}/archive/") {
            3
        } else if url == format!("{base}/friends/") {
            4
        } else {
            999
        }
    };

    urls.sort_by(|a, b| priority(a).cmp(&priority(b)).then_with(|| a.cmp(b)));
    urls
}

/// Run every discovery source over `dist` and return the ordered, unique
/// URL list ready for submission.
pub fn discover_pages(dist: &Path, site_url: &str) -> Vec<String> {
    let from_sitemap = sitemap_urls(&dist.join("client"), site_url);
    let from_scan = scan_pages(dist, site_url);
    let fallback = important_pages(site_url);

    let merged = merge_and_dedupe(&[from_sitemap, from_scan, fallback]);
    log::info!("{} unique URLs after merge", merged.len());

    sort_by_priority(merged, site_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://www.example.com";

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn sitemap_urls_extracts_loc_entries_for_site() {
        let dist = tempfile::tempdir().unwrap();
        write(
            dist.path(),
            "sitemap.xml",
            r#"<urlset>
                <url><loc>https://www.example.com/</loc></url>
                <url><loc> https://www.example.com/posts/hello/ </loc></url>
                <url><loc>https://other.site/page/</loc></url>
            </urlset>"#,
        );

        let urls = sitemap_urls(dist.path(), SITE);
        assert_eq!(
            urls,
            vec![
                "https://www.example.com/".to_string(),
                "https://www.example.com/posts/hello/".to_string(),
            ]
        );
    }

    #[test]
    fn sitemap_urls_empty_when_file_missing() {
        let dist = tempfile::tempdir().unwrap();
        assert!(sitemap_urls(dist.path(), SITE).is_empty());
    }

    #[test]
    fn scan_finds_index_html_and_skips_asset_dirs() {
        let dist = tempfile::tempdir().unwrap();
        write(dist.path(), "index.html", "<html/>");
        write(dist.path(), "about/index.html", "<html/>");
        write(dist.path(), "posts/hello/index.html", "<html/>");
        write(dist.path(), "_astro/index.html", "<html/>");
        write(dist.path(), "api/index.html", "<html/>");
        write(dist.path(), "about/style.css", "");

        let mut urls = scan_pages(dist.path(), SITE);
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "https://www.example.com/".to_string(),
                "https://www.example.com/about/".to_string(),
                "https://www.example.com/posts/hello/".to_string(),
            ]
        );
    }

    #[test]
    fn scan_prefers_client_subdirectory() {
        let dist = tempfile::tempdir().unwrap();
        write(dist.path(), "client/index.html", "<html/>");
        write(dist.path(), "server/index.html", "<html/>");

        let urls = scan_pages(dist.path(), SITE);
        assert_eq!(urls, vec!["https://www.example.com/".to_string()]);
    }

    #[test]
    fn merge_normalizes_and_dedupes() {
        let merged = merge_and_dedupe(&[
            vec![
                "https://www.example.com/about".to_string(),
                "https://www.example.com/search?q=x".to_string(),
            ],
            vec!["https://www.example.com/about/".to_string()],
        ]);
        assert_eq!(
            merged,
            vec![
                "https://www.example.com/about/".to_string(),
                "https://www.example.com/search?q=x".to_string(),
            ]
        );
    }

    #[test]
    fn priority_pages_sort_first_then_alphabetical() {
        let sorted = sort_by_priority(
            vec![
                format!("{SITE}/posts/zebra/"),
                format!("{SITE}/friends/"),
                format!("{SITE}/posts/alpha/"),
                format!("{SITE}/"),
                format!("{SITE}/about/"),
            ],
            SITE,
        );
        assert_eq!(
            sorted,
            vec![
                format!("{SITE}/"),
                format!("{SITE}/about/"),
                format!("{SITE}/friends/"),
                format!("{SITE}/posts/alpha/"),
                format!("{SITE}/posts/zebra/"),
            ]
        );
    }

    #[test]
    fn discover_pages_always_includes_important_fallback() {
        let dist = tempfile::tempdir().unwrap();
        let urls = discover_pages(dist.path(), SITE);
        assert!(urls.contains(&format!("{SITE}/")));
        assert!(urls.contains(&format!("{SITE}/music/")));
        assert_eq!(urls.first(), Some(&format!("{SITE}/")));
    }
}
