use fet_bridge::models::{Activity, ActivityId};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Structural view of an exported solver document, read back for
/// round-trip assertions. Only the parts the tests compare are modeled.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub institution: String,
    pub days: Vec<String>,
    pub activities: Vec<Activity>,
    pub time_constraint_tags: Vec<String>,
    pub space_constraint_tags: Vec<String>,
}

/// Read an exported document back into a [`ParsedDocument`].
///
/// Panics on malformed input; the exporter is expected to always emit
/// well-formed markup.
pub fn parse_document(xml: &str) -> ParsedDocument {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut doc = ParsedDocument::default();
    let mut path: Vec<String> = Vec::new();
    let mut fields: HashMap<String, String> = HashMap::new();

    loop {
        match reader.read_event().expect("well-formed exported document") {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                record_constraint_tag(&mut doc, &path, &name);
                if name == "Activity" {
                    fields.clear();
                }
                path.push(name);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                record_constraint_tag(&mut doc, &path, &name);
            }
            Event::Text(t) => {
                let text = t.unescape().expect("decodable text").into_owned();
                match path.as_slice() {
                    [.., parent, field] if parent == "Activity" => {
                        fields.insert(field.clone(), text);
                    }
                    [.., parent, field] if parent == "Day" && field == "Name" => {
                        doc.days.push(text);
                    }
                    [.., field] if field == "Institution_Name" => {
                        doc.institution = text;
                    }
                    _ => {}
                }
            }
            Event::End(_) => {
                if path.pop().as_deref() == Some("Activity") {
                    doc.activities.push(Activity {
                        id: ActivityId::new(fields["Id"].parse().expect("numeric id")),
                        teacher: fields["Teacher"].clone(),
                        subject: fields["Subject"].clone(),
                        students: fields["Students"].clone(),
                        duration: fields["Duration"].parse().expect("numeric duration"),
                        total_duration: fields["Total_Duration"]
                            .parse()
                            .expect("numeric total duration"),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    doc
}

fn record_constraint_tag(doc: &mut ParsedDocument, path: &[String], name: &str) {
    match path.last().map(String::as_str) {
        Some("Time_Constraints_List") => doc.time_constraint_tags.push(name.to_string()),
        Some("Space_Constraints_List") => doc.space_constraint_tags.push(name.to_string()),
        _ => {}
    }
}
