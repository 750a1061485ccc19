//! Patch steps for the menu shell bundle (`sp.js`).
//!
//! `sp.js` renders the Deck UI chrome: the main menu tabs and the quick
//! access overlay. Both patches splice rendering expressions that map
//! externally populated descriptor lists (`window.csMenuItems`,
//! `window.csQuickAccessItems`) into real elements, and both install a
//! forced-rerender callback so the plugin runtime can refresh the UI after
//! changing those lists.

use regex::Regex;
use tracing::info;

use crate::anchor;
use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::hooks;
use crate::line_buffer::LineBuffer;

lazy_static::lazy_static! {
    static ref SETTINGS_TAB_RE: Regex =
        Regex::new(r##"label:.*"#MainTabsSettings""##).unwrap();
    static ref POWER_ITEM_RE: Regex = Regex::new(r##"label:.*"#Power""##).unwrap();
    /// An element-construction call through the minified UI-library alias,
    /// e.g. `i.q.createElement(o, ` — capture runs through the last comma so
    /// the spliced call can reuse the component argument.
    static ref CREATE_ELEMENT_CALL_RE: Regex =
        Regex::new(r"^.*(\w+\.\w+\.createElement\(.+,).*$").unwrap();
    /// A render return, capturing the two-part UI-library alias itself.
    static ref RETURN_CREATE_ELEMENT_RE: Regex =
        Regex::new(r"return.*(\w+\.\w+)\.createElement").unwrap();
    static ref ROUTE_PROP_RE: Regex = Regex::new(r#"\[.*"route".*\]"#).unwrap();
    static ref TAB_COMPONENT_RE: Regex =
        Regex::new(r"^\s*tab: .*createElement\((.+), .+\)").unwrap();
}

/// Run both menu-shell patch steps. Every anchor here is load-bearing: a
/// miss fails the whole file.
pub(crate) fn apply(buf: &mut LineBuffer, config: &PatchConfig) -> Result<(), PatchError> {
    let ui_alias = patch_menu_items(buf, config)?;
    patch_quick_access(buf, config, &ui_alias)?;
    Ok(())
}

/// Splice plugin menu items below the built-in settings tab.
///
/// Returns the captured UI-library alias for reuse by later steps.
fn patch_menu_items(buf: &mut LineBuffer, config: &PatchConfig) -> Result<String, PatchError> {
    info!("Patching main menu...");
    let windows = &config.windows;

    let settings =
        anchor::find_line_matching(buf, &SETTINGS_TAB_RE, "main tabs settings label")?;
    let power = anchor::find_line_matching(buf, &POWER_ITEM_RE, "power menu item label")?;

    // The power item is built with the same component custom items should
    // use; steal its construction call.
    let create = anchor::scan_backward_for(
        buf,
        power.line.saturating_sub(1),
        windows.create_element_lookback,
        &CREATE_ELEMENT_CALL_RE,
        "menu item element constructor",
    )?;
    let Some(create_call) = create.capture else {
        return Err(PatchError::anchor("menu item element constructor capture"));
    };

    let splice_line = anchor::scan_forward_containing(
        buf,
        settings.line + 1,
        windows.menu_splice_lookahead,
        "createElement",
        "menu items splice point",
    )?;

    let line = buf.line(splice_line).to_owned();
    let Some(close) = line.rfind(')') else {
        return Err(PatchError::anchor("menu items splice point parenthesis"));
    };
    // Skip the closing paren and the one character after it (the list
    // separator); stepping by chars keeps the split on a boundary even when
    // the file carries multi-byte text.
    let insert_col = match line[close + 1..].chars().next() {
        Some(c) => close + 1 + c.len_utf8(),
        None => close + 1,
    };

    let rendered = format!(
        "(window.csMenuItems || []).map(
    (item) => {create_call}
        {{
            label: item.label,
            active: window.csMenuActiveItem && window.csMenuActiveItem === item.id,
            action: () => {{
                smm.IPC.send('csMenuItemClicked', {{ id: item.id }});
            }},
        }}
    )),
"
    );
    buf.set_line(
        splice_line,
        format!("{} {rendered}{}", &line[..insert_col], &line[insert_col..]),
    );

    // The component's render return is where hooks can run: install the
    // forced-rerender callback and the injection request on mount.
    let ret = anchor::scan_backward_for(
        buf,
        settings.line.saturating_sub(1),
        windows.react_alias_lookback,
        &RETURN_CREATE_ELEMENT_RE,
        "ui library alias",
    )?;
    let Some(ui_alias) = ret.capture else {
        return Err(PatchError::anchor("ui library alias capture"));
    };

    let request =
        hooks::rpc_post_snippet(config.server_port, "InjectService.InjectMenu", "[{}]");
    let rerender = format!(
        "const [, csMenuForceUpdate] = {ui}.useState();
window.csMenuUpdate = {ui}.useCallback(() => {{
    csMenuForceUpdate({{}});
}}, [csMenuForceUpdate]);

{ui}.useEffect(() => {{
    console.info('[crankshaft] Menu mounted, requesting plugin injection');
{request}
}}, []);

",
        ui = ui_alias
    );
    buf.prepend_to_line(ret.line, &rerender);

    // Built-in items must drop their "active" highlight whenever a plugin
    // item is the active one.
    let route = anchor::scan_backward_for(
        buf,
        settings.line.saturating_sub(1),
        windows.route_prop_lookback,
        &ROUTE_PROP_RE,
        "route prop table",
    )?;
    let active = anchor::scan_forward_containing(
        buf,
        route.line + 1,
        windows.active_prop_lookahead,
        "active:",
        "active menu item prop",
    )?;
    let suppressed =
        buf.line(active)
            .replacen("active:", "active: window.csMenuActiveItem ? false :", 1);
    buf.set_line(active, suppressed);

    Ok(ui_alias)
}

/// Splice plugin tabs into the quick access overlay's tab array, reusing the
/// built-in settings tab's shell component, and notify the front door when
/// the overlay mounts.
fn patch_quick_access(
    buf: &mut LineBuffer,
    config: &PatchConfig,
    ui_alias: &str,
) -> Result<(), PatchError> {
    info!("Patching quick access menu...");
    let windows = &config.windows;

    let title = anchor::find_line_containing(
        buf,
        "#QuickAccess_Tab_Settings_Title",
        "quick access settings title",
    )?;

    let tab = anchor::scan_forward_for(
        buf,
        title + 1,
        windows.tab_component_lookahead,
        &TAB_COMPONENT_RE,
        "quick access tab component",
    )?;
    let Some(tab_component) = tab.capture else {
        return Err(PatchError::anchor("quick access tab component capture"));
    };

    // The exact entries in the tabs array vary; the `}].filter` closing of
    // the array literal does not.
    let term = anchor::scan_forward_for_prefix(
        buf,
        title + 6,
        windows.tabs_terminator_lookahead,
        "}].filter",
        "quick access tabs terminator",
    )?;
    let rest = buf
        .line(term)
        .trim_start()
        .strip_prefix('}')
        .unwrap_or_default()
        .to_owned();

    let request =
        hooks::rpc_post_snippet(config.server_port, "InjectService.InjectQuickAccess", "[{}]");
    let replacement = format!(
        "}}, ...(
    (window.csQuickAccessItems || []).map((item) => ({{
        key: item.id,
        title: {ui}.createElement({ui}.Fragment, null),
        tab: {ui}.createElement({tab_component}, null),
        panel: {ui}.createElement('div', {{
            'data-cs-quick-access-item': item.id,
        }}),
    }}))
){rest}
const [, csQuickAccessForceUpdate] = {ui}.useState();
window.csQuickAccessUpdate = {ui}.useCallback(() => {{
    csQuickAccessForceUpdate({{}});
}}, [csQuickAccessForceUpdate]);

{ui}.useEffect(() => {{
    console.info('[crankshaft] Quick access mounted, requesting plugin injection');
{request}
}}, []);",
        ui = ui_alias
    );
    buf.set_line(term, replacement);

    Ok(())
}
