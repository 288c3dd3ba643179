//! `YAMAHA_AV` request documents and response parsing.
//!
//! Every request is a `<YAMAHA_AV cmd="PUT|GET">` document addressing the
//! main zone. Responses echo the same tree with an `RC` result code on the
//! root element; `RC="0"` means success.

use xmltree::{Element, EmitterConfig, XMLNode};

use avsync_domain::state::DeviceState;
use avsync_domain::volume::VOLUME_DB_MIN;

use crate::error::YamahaError;

/// Path of the control endpoint on the receiver.
pub const CONTROL_PATH: &str = "/YamahaRemoteControl/ctrl";

const ROOT: &str = "YAMAHA_AV";
const ZONE: &str = "Main_Zone";
const GET_PARAM: &str = "GetParam";

const POWER: [&str; 2] = ["Power_Control", "Power"];
const MUTE: [&str; 2] = ["Volume", "Mute"];
const VOLUME_LEVEL: [&str; 2] = ["Volume", "Lvl"];
const INPUT: [&str; 2] = ["Input", "Input_Sel"];
const SOUND_PROGRAM: [&str; 4] = ["Surround", "Program_Sel", "Current", "Sound_Program"];

#[derive(Clone, Copy)]
enum Cmd {
    Get,
    Put,
}

impl Cmd {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

fn leaf(name: &str, value: &str) -> XMLNode {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(value.to_string()));
    XMLNode::Element(element)
}

/// Wrap `content` in `Main_Zone/<path>` under a `YAMAHA_AV` root.
fn document(cmd: Cmd, path: &[&str], content: Vec<XMLNode>) -> Element {
    let mut children = content;
    for name in path.iter().rev().chain(std::iter::once(&ZONE)) {
        let mut element = Element::new(name);
        element.children = children;
        children = vec![XMLNode::Element(element)];
    }

    let mut root = Element::new(ROOT);
    root.attributes.insert("cmd".to_string(), cmd.as_str().to_string());
    root.children = children;
    root
}

fn put_text(path: &[&str], value: &str) -> Element {
    match path.split_last() {
        Some((last, parents)) => document(Cmd::Put, parents, vec![leaf(last, value)]),
        None => document(Cmd::Put, &[], Vec::new()),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "On" } else { "Off" }
}

#[must_use]
pub fn power_request(on: bool) -> Element {
    put_text(&POWER, if on { "On" } else { "Standby" })
}

#[must_use]
pub fn mute_request(mute: bool) -> Element {
    put_text(&MUTE, on_off(mute))
}

/// Absolute volume in tenths of a decibel, truncated toward zero.
#[must_use]
pub fn volume_request(db: f64) -> Element {
    #[allow(clippy::cast_possible_truncation)]
    let tenths = (db * 10.0).trunc() as i32;
    document(
        Cmd::Put,
        &VOLUME_LEVEL,
        vec![
            leaf("Val", &tenths.to_string()),
            leaf("Exp", "1"),
            leaf("Unit", "dB"),
        ],
    )
}

#[must_use]
pub fn input_request(name: &str) -> Element {
    put_text(&INPUT, name)
}

#[must_use]
pub fn surround_program_request(name: &str) -> Element {
    put_text(&SOUND_PROGRAM, name)
}

#[must_use]
pub fn basic_status_request() -> Element {
    document(Cmd::Get, &[], vec![leaf("Basic_Status", GET_PARAM)])
}

#[must_use]
pub fn input_list_request() -> Element {
    document(Cmd::Get, &["Input"], vec![leaf("Input_Sel_Item", GET_PARAM)])
}

/// Serialise a request document.
///
/// # Errors
///
/// Returns [`YamahaError::Encode`] if the writer fails.
pub fn encode(request: &Element) -> Result<Vec<u8>, YamahaError> {
    let mut body = Vec::new();
    request
        .write_with_config(&mut body, EmitterConfig::new().perform_indent(false))
        .map_err(YamahaError::Encode)?;
    Ok(body)
}

/// Parse a response body and check its result code.
///
/// # Errors
///
/// Returns [`YamahaError::Parse`] for malformed XML and
/// [`YamahaError::Rejected`] when `RC` is present and not `0`.
pub fn decode(body: &[u8]) -> Result<Element, YamahaError> {
    let root = Element::parse(body).map_err(YamahaError::Parse)?;
    match root.attributes.get("RC") {
        Some(code) if code.trim() != "0" => Err(YamahaError::Rejected(code.clone())),
        _ => Ok(root),
    }
}

fn descend<'a>(node: &'a Element, path: &[&str]) -> Option<&'a Element> {
    path.iter().try_fold(node, |node, name| node.get_child(*name))
}

fn text_at(node: &Element, path: &[&str]) -> Option<String> {
    let text = descend(node, path)?.get_text()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn is_on(value: &str) -> bool {
    value.eq_ignore_ascii_case("on")
}

/// Read a [`DeviceState`] from a `Basic_Status` response.
///
/// # Errors
///
/// Returns [`YamahaError::MissingElement`] when the status, power, or mute
/// element is absent and [`YamahaError::InvalidNumber`] when the volume level
/// is not numeric. A missing input or sound program is reported as absent; a
/// missing volume level reads as the range minimum.
pub fn parse_basic_status(root: &Element) -> Result<DeviceState, YamahaError> {
    let status = descend(root, &[ZONE, "Basic_Status"])
        .ok_or(YamahaError::MissingElement("Main_Zone/Basic_Status"))?;

    let power = text_at(status, &POWER).ok_or(YamahaError::MissingElement("Power_Control/Power"))?;
    let mute = text_at(status, &MUTE).ok_or(YamahaError::MissingElement("Volume/Mute"))?;
    let volume_db = match text_at(status, &[VOLUME_LEVEL[0], VOLUME_LEVEL[1], "Val"]) {
        Some(raw) => raw.parse::<f64>().map_err(|_| YamahaError::InvalidNumber(raw))? / 10.0,
        None => VOLUME_DB_MIN,
    };

    Ok(DeviceState::new(
        is_on(&power),
        text_at(status, &INPUT),
        text_at(status, &SOUND_PROGRAM),
        volume_db,
        is_on(&mute),
    ))
}

/// Read the selectable input names from an `Input_Sel_Item` response.
///
/// Only entries whose `RW` flag contains `W` are returned.
///
/// # Errors
///
/// Returns [`YamahaError::MissingElement`] when the item list is absent.
pub fn parse_input_list(root: &Element) -> Result<Vec<String>, YamahaError> {
    let items = descend(root, &[ZONE, "Input", "Input_Sel_Item"])
        .ok_or(YamahaError::MissingElement("Main_Zone/Input/Input_Sel_Item"))?;

    Ok(items
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(|item| text_at(item, &["RW"]).is_some_and(|rw| rw.contains('W')))
        .filter_map(|item| text_at(item, &["Param"]))
        .collect())
}
