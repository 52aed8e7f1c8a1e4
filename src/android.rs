//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{catalog, overlay_svg};

/// Annotate rendered SVG with fingering diagrams.
///
/// Called from Kotlin as:
///   external fun overlaySvg(svg: String, semanticJson: String, configJson: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_fingerlib_app_FingerLib_overlaySvg(
    mut env: JNIEnv,
    _class: JClass,
    svg: JString,
    semantic_json: JString,
    config_json: JString,
) -> jstring {
    let svg: String = match env.get_string(&svg) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    let semantic: String = match env.get_string(&semantic_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    let config: Option<String> = if config_json.is_null() {
        None
    } else {
        env.get_string(&config_json).ok().map(|s| s.into())
    };

    match overlay_svg(&svg, &semantic, config.as_deref()) {
        Ok(markup) => match env.new_string(&markup) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::error!("{e}");
            std::ptr::null_mut()
        }
    }
}

/// Scan a tune folder and return its catalog as JSON.
///
/// Called from Kotlin as:
///   external fun catalog(root: String): String?
#[no_mangle]
pub extern "system" fn Java_com_fingerlib_app_FingerLib_catalog(
    mut env: JNIEnv,
    _class: JClass,
    root: JString,
) -> jstring {
    let root: String = match env.get_string(&root) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let json = match catalog::scan(&root) {
        Ok(entries) => catalog::catalog_to_json(&entries).ok(),
        Err(e) => {
            log::error!("{e}");
            None
        }
    };

    match json.map(|j| env.new_string(&j)) {
        Some(Ok(js)) => js.into_raw(),
        _ => std::ptr::null_mut(),
    }
}
