//! Patch steps for the library-root bundle.
//!
//! This is the script backing Steam's library view. The file name changes
//! between builds (the orchestrator finds it by content signature), and all
//! identifiers inside are minified, so every step here navigates by the few
//! things that survive minification: known method names, localization keys,
//! and structural punctuation.

use regex::Regex;
use tracing::warn;

use crate::anchor;
use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::hooks;
use crate::line_buffer::LineBuffer;

lazy_static::lazy_static! {
    /// A method unique to the internal library controller class. The class
    /// name is minified; this method name is not.
    static ref CONTROLLER_METHOD_RE: Regex =
        Regex::new(r"ExcludedTitlesForPlatform\(.*\) \{").unwrap();
    static ref CONSTRUCTOR_RE: Regex = Regex::new(r"constructor\(.*\) \{").unwrap();
    static ref BUTTON_DOWN_RE: Regex = Regex::new(r"OnButtonDown\((\S+),.+\) \{").unwrap();
    static ref APP_OVERVIEW_RE: Regex =
        Regex::new(r"GetAppOverviewByAppID\(([a-zA-Z0-9]+)\)").unwrap();
}

/// Run all library-root patch steps against an unminified buffer.
///
/// Controller exposure and button interception are conveniences: if their
/// anchors moved, the rest of the patch is still worth having, so they log
/// and degrade. The app-properties hook and the boot hook are load-bearing.
pub(crate) fn apply(buf: &mut LineBuffer, config: &PatchConfig) -> Result<(), PatchError> {
    if let Err(e) = expose_library_controller(buf, config) {
        warn!("Skipping library controller exposure: {e}");
    }
    if let Err(e) = install_button_interceptor(buf) {
        warn!("Skipping button interceptor: {e}");
    }
    install_app_properties_hook(buf, config)?;
    install_boot_hook(buf, config);
    Ok(())
}

/// Attach the library controller instance to the window so injected scripts
/// can reach it: find the one method we know belongs to the class, walk back
/// to the nearest constructor, and drop a global assignment just inside it.
fn expose_library_controller(
    buf: &mut LineBuffer,
    config: &PatchConfig,
) -> Result<(), PatchError> {
    let method =
        anchor::find_line_matching(buf, &CONTROLLER_METHOD_RE, "library controller method")?;
    let ctor = anchor::scan_backward_for(
        buf,
        method.line.saturating_sub(1),
        config.windows.constructor_lookback,
        &CONSTRUCTOR_RE,
        "library controller constructor",
    )?;

    buf.insert(ctor.line + 1, "window.csLibraryController = this;".to_owned());
    Ok(())
}

/// Give plugins first refusal on controller button events. Interceptors are
/// consulted newest-first so the last registered one wins, and a truthy
/// handler return suppresses the default behavior.
fn install_button_interceptor(buf: &mut LineBuffer) -> Result<(), PatchError> {
    let found = anchor::find_line_matching(buf, &BUTTON_DOWN_RE, "controller button handler")?;
    let Some(event_arg) = found.capture else {
        return Err(PatchError::anchor("controller button event argument"));
    };

    let snippet = format!(
        "
if (window.csButtonInterceptors) {{
    for (const {{ handler }} of [...window.csButtonInterceptors].reverse()) {{
        if (handler({event_arg})) {{
            return;
        }}
    }}
}}"
    );
    buf.append_to_line(found.line, &snippet);
    Ok(())
}

/// Notify the front door when the app-properties dialog renders, with the
/// app id captured from the nearby overview accessor, so plugins can add
/// property pages for that title.
fn install_app_properties_hook(
    buf: &mut LineBuffer,
    config: &PatchConfig,
) -> Result<(), PatchError> {
    let title = anchor::find_line_containing(
        buf,
        "#AppProperties_ShortcutPage",
        "app properties title",
    )?;
    let overview = anchor::scan_backward_for(
        buf,
        title.saturating_sub(1),
        config.windows.app_id_lookback,
        &APP_OVERVIEW_RE,
        "app overview accessor",
    )?;
    let Some(app_id) = overview.capture else {
        return Err(PatchError::anchor("app overview id argument"));
    };
    let ret = anchor::scan_backward_for_prefix(
        buf,
        title.saturating_sub(1),
        config.windows.return_lookback,
        "return",
        "app properties render return",
    )?;

    let notify = hooks::rpc_post_snippet(
        config.server_port,
        "InjectService.OpenAppProperties",
        &format!("[{{ appId: {app_id} }}]"),
    );
    buf.prepend_to_line(ret, &format!("{notify}\n"));
    Ok(())
}

/// Prepend the boot script: once the page finishes loading, ask the local
/// front door to inject the plugin runtime into the library view.
fn install_boot_hook(buf: &mut LineBuffer, config: &PatchConfig) {
    let request =
        hooks::rpc_post_snippet(config.server_port, "InjectService.InjectLibrary", "[]");
    let script = format!(
        "console.info('[crankshaft] Loading patched library bundle');
window.addEventListener('load', () => {{
    console.info('[crankshaft] Page loaded, requesting plugin injection');
{request}
}});"
    );
    buf.insert(0, script);
}
