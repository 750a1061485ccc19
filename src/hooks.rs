//! Generated JavaScript snippets shared by the patch steps.
//!
//! The hook registries these snippets reference (`window.csMenuItems`,
//! `window.csButtonInterceptors`, ...) are external contract names populated
//! by the injected plugin runtime; the engine only emits them as opaque
//! strings and holds no state about them.

use crate::PATCH_MARKER;
use crate::line_buffer::LineBuffer;

/// Stamp the marker comment and the per-run auth token at the top of a
/// patched buffer. Runs after all patch steps so the marker always ends up
/// on the first line.
pub(crate) fn stamp_marker(buf: &mut LineBuffer, version: &str, auth_token: &str) {
    buf.insert(
        0,
        format!("// {PATCH_MARKER} v{version}\nwindow.csAuthToken = '{auth_token}';"),
    );
}

/// A `fetch()` POST of the JSON-RPC envelope to the local front door,
/// carrying the per-run auth token header.
pub(crate) fn rpc_post_snippet(server_port: u16, method: &str, params: &str) -> String {
    format!(
        "fetch('http://localhost:{server_port}/rpc', {{
    method: 'POST',
    headers: {{
        'Content-Type': 'application/json',
        'X-Cs-Auth': window.csAuthToken,
    }},
    body: JSON.stringify({{
        method: '{method}',
        params: {params},
        id: Date.now(),
    }}),
}});"
    )
}
