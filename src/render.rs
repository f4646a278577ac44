//! nginx site rendering
//!
//! The literal values below are policy defaults for the generated site.
//! They are fixed per build; nothing here reads the filesystem or network.

use crate::site::ProxySiteConfig;

/// Plaintext listener
pub const LISTEN_PORT: u16 = 80;
/// Backend protocol version; 1.1 keeps connections alive and allows upgrades
pub const PROXY_HTTP_VERSION: &str = "1.1";
/// Applies to proxy_connect_timeout, proxy_send_timeout and proxy_read_timeout
pub const PROXY_TIMEOUT: &str = "60s";
pub const PROXY_BUFFER_SIZE: &str = "128k";
pub const PROXY_BUFFERS: &str = "4 256k";
pub const PROXY_BUSY_BUFFERS_SIZE: &str = "256k";
/// Status used for the root redirect
pub const REDIRECT_STATUS: u16 = 302;
pub const HEALTH_PATH: &str = "/health";

/// Render the complete server block for a site
pub fn render(site: &ProxySiteConfig) -> String {
    let mut out = format!(
        "server {{\n    listen {port};\n    listen [::]:{port};\n    server_name {} {};\n",
        site.domain,
        site.www_alias(),
        port = LISTEN_PORT,
    );

    if let Some(path) = &site.root_redirect {
        out.push_str(&format!(
            "\n    location = / {{\n        return {} {};\n    }}\n",
            REDIRECT_STATUS, path
        ));
    }

    if site.custom_logs {
        out.push_str(&format!(
            "\n    access_log {};\n    error_log {};\n",
            site.access_log_path().display(),
            site.error_log_path().display()
        ));
    }

    out.push('\n');
    out.push_str(&proxy_location(site));
    out.push('\n');
    out.push_str(&health_location(site));
    out.push_str("}\n");
    out
}

fn health_location(site: &ProxySiteConfig) -> String {
    format!(
        r#"    location = {path} {{
        access_log off;
        default_type text/plain;
        return 200 "healthy: {domain}\n";
    }}
"#,
        path = HEALTH_PATH,
        domain = site.domain,
    )
}

fn proxy_location(site: &ProxySiteConfig) -> String {
    format!(
        r#"    location / {{
        proxy_pass {upstream};
        proxy_http_version {version};

        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;

        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection "upgrade";

        proxy_connect_timeout {timeout};
        proxy_send_timeout {timeout};
        proxy_read_timeout {timeout};

        proxy_buffering on;
        proxy_buffer_size {buffer_size};
        proxy_buffers {buffers};
        proxy_busy_buffers_size {busy};
    }}
"#,
        upstream = site.upstream_url(),
        version = PROXY_HTTP_VERSION,
        timeout = PROXY_TIMEOUT,
        buffer_size = PROXY_BUFFER_SIZE,
        buffers = PROXY_BUFFERS,
        busy = PROXY_BUSY_BUFFERS_SIZE,
    )
}
