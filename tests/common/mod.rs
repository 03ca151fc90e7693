use serde_json::{Value, json};

/// A fragment as the decoder would emit it: position plus plain text, which
/// is percent-encoded when the fixture is rendered.
pub type Fragment<'a> = (f64, f64, &'a str);

fn text_json(x: f64, y: f64, text: &str) -> Value {
    json!({
        "x": x,
        "y": y,
        "w": 0,
        "R": [{ "T": urlencoding::encode(text), "S": -1, "TS": [0, 12, 0, 0] }],
    })
}

/// Renders pages of fragments as pdf2json output.
pub fn pdf2json_document(pages: &[Vec<Fragment<'_>>]) -> String {
    let pages = pages
        .iter()
        .map(|fragments| {
            json!({
                "Width": 38.25,
                "Height": 49.5,
                "Texts": fragments
                    .iter()
                    .map(|&(x, y, text)| text_json(x, y, text))
                    .collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();

    json!({ "Pages": pages }).to_string()
}

/// Header fragments for a page with Monday/Tuesday rows and three slots.
pub fn timetable_header(room: &str) -> Vec<Fragment<'_>> {
    vec![
        (2.0, 1.0, room),
        (1.0, 10.0, "Mon"),
        (1.0, 14.0, "Tue"),
        (5.0, 5.0, "8:00 - 9:15"),
        (20.0, 5.0, "9:15 - 10:30"),
        (35.0, 5.0, "10:30 - 11:45"),
    ]
}
