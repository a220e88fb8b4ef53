//! Translation of key chords and clicks into `Input.dispatch*Event` commands.

use crate::{Error, Result};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use undocheck_core::{KeyChord, Modifiers};

/// (flag, DOM key, DOM code, virtual key code), in press order
const MODIFIER_KEYS: [(Modifiers, &str, &str, i64); 4] = [
    (Modifiers::CONTROL, "Control", "ControlLeft", 17),
    (Modifiers::ALT, "Alt", "AltLeft", 18),
    (Modifiers::META, "Meta", "MetaLeft", 91),
    (Modifiers::SHIFT, "Shift", "ShiftLeft", 16),
];

/// Key events for pressing and releasing `chord`.
///
/// Modifiers go down first and come up last, with the modifier state
/// accumulated on every event so the page sees `ctrlKey`/`metaKey` the way a
/// physical keyboard would report them.
pub(crate) fn key_events(chord: &KeyChord) -> Result<Vec<DispatchKeyEventParams>> {
    let held: Vec<_> = MODIFIER_KEYS
        .iter()
        .filter(|(flag, ..)| chord.modifiers.contains(*flag))
        .collect();

    let mut events = Vec::with_capacity(held.len() * 2 + 2);
    let mut state = 0i64;

    for (flag, key, code, vk) in &held {
        state |= flag.bits();
        events.push(build_key(
            DispatchKeyEventType::RawKeyDown,
            state,
            key,
            code,
            *vk,
            None,
        )?);
    }

    let key = chord.dom_key();
    let code = chord.key.code();
    let vk = chord.key.windows_virtual_key_code();
    let text = chord.text();
    let down = if text.is_some() {
        DispatchKeyEventType::KeyDown
    } else {
        DispatchKeyEventType::RawKeyDown
    };
    events.push(build_key(down, state, &key, &code, vk, text)?);
    events.push(build_key(DispatchKeyEventType::KeyUp, state, &key, &code, vk, None)?);

    for (flag, key, code, vk) in held.iter().rev() {
        state &= !flag.bits();
        events.push(build_key(
            DispatchKeyEventType::KeyUp,
            state,
            key,
            code,
            *vk,
            None,
        )?);
    }

    Ok(events)
}

fn build_key(
    kind: DispatchKeyEventType,
    modifiers: i64,
    key: &str,
    code: &str,
    vk: i64,
    text: Option<String>,
) -> Result<DispatchKeyEventParams> {
    let mut builder = DispatchKeyEventParams::builder()
        .r#type(kind)
        .modifiers(modifiers)
        .key(key)
        .code(code)
        .windows_virtual_key_code(vk)
        .native_virtual_key_code(vk);
    if let Some(text) = text {
        builder = builder.text(text.clone()).unmodified_text(text);
    }
    builder.build().map_err(Error::Cdp)
}

/// Move, press and release the left button at viewport coordinates
pub(crate) fn click_events(x: f64, y: f64) -> Result<Vec<DispatchMouseEventParams>> {
    let moved = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MouseMoved)
        .x(x)
        .y(y)
        .build()
        .map_err(Error::Cdp)?;

    let mut events = vec![moved];
    for kind in [
        DispatchMouseEventType::MousePressed,
        DispatchMouseEventType::MouseReleased,
    ] {
        events.push(
            DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(x)
                .y(y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(Error::Cdp)?,
        );
    }
    Ok(events)
}
