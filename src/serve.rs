//! Development server for the course tree.
//!
//! Serves the course root over HTTP so the manifest artifacts
//! (`<module>/manifest.json`, `assets/manifest.json`) are reachable exactly
//! where runtime pages expect to fetch them. With watch enabled, a watcher
//! thread keeps the manifests fresh while files are edited.

use crate::{config::SiteConfig, log, watch::watch_for_changes_blocking};
use anyhow::{Context, Result};
use std::{
    fs,
    io::Cursor,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Start the development server with optional file watching.
///
/// Blocks until Ctrl+C.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let base_port = config.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    // Spawn file watcher thread
    if config.serve.watch {
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(config) {
                log!("watch"; "{err}");
            }
        });
    }

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Handle a single HTTP request.
///
/// Request resolution order:
/// 1. Exact file match → serve file
/// 2. Directory with index.html → serve index.html
/// 3. Directory without index.html → generate listing
/// 4. Nothing found → 404
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    let Some((local_path, request_path)) = resolve_local_path(config.get_root(), request.url())
    else {
        return serve_not_found(request);
    };

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }

        if let Ok(listing) = generate_directory_listing(&local_path, &request_path) {
            return serve_html(request, listing);
        }
    }

    serve_not_found(request)
}

/// Map a request URL onto a path under the serve root.
///
/// Decodes percent-escapes, strips the query string, and rejects any path
/// with a `..` component so no request can escape the serve root.
fn resolve_local_path(serve_root: &Path, url: &str) -> Option<(PathBuf, String)> {
    let url_path = urlencoding::decode(url)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/').to_string();

    if Path::new(&request_path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    Some((serve_root.join(&request_path), request_path))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Generate HTML directory listing for browsing.
///
/// Shows directories and `.html` files, hides dotfiles and the progress
/// store directory.
fn generate_directory_listing(dir_path: &PathBuf, request_path: &str) -> std::io::Result<String> {
    let entries: Vec<_> = fs::read_dir(dir_path)?
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            !name_str.starts_with('.')
                && (is_dir || name_str.ends_with(".html") || name_str.ends_with(".json"))
        })
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let icon = if is_dir { "📁" } else { "📄" };
            let href = if request_path.is_empty() {
                format!("/{name}")
            } else {
                format!("/{request_path}/{name}")
            };
            format!(r#"<li><span>{icon}</span> <a href="{href}">{name}</a></li>"#)
        })
        .collect();

    let parent_link = if request_path.is_empty() {
        String::new()
    } else {
        let parent_path = Path::new(request_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(r#"<li><span>📂</span> <a href="/{parent_path}">..</a></li>"#)
    };

    Ok(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>/{request_path}</title></head><body>\
         <h1>/{request_path}</h1><ul>{parent_link}{}</ul></body></html>",
        entries.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_query_and_joins() {
        let root = Path::new("/srv/course");
        let (local, rel) = resolve_local_path(root, "/math/a.html?x=1").unwrap();
        assert_eq!(local, Path::new("/srv/course/math/a.html"));
        assert_eq!(rel, "math/a.html");
    }

    #[test]
    fn test_resolve_root_url() {
        let root = Path::new("/srv/course");
        let (local, rel) = resolve_local_path(root, "/").unwrap();
        assert_eq!(local, root);
        assert_eq!(rel, "");
    }

    #[test]
    fn test_resolve_rejects_parent_traversal() {
        let root = Path::new("/srv/course");
        assert!(resolve_local_path(root, "/../secret").is_none());
        assert!(resolve_local_path(root, "/math/../../etc/passwd").is_none());
        // Percent-encoded dots decode before the check
        assert!(resolve_local_path(root, "/%2e%2e/secret").is_none());
    }
}
