//! Decode an embedded Rails-style session payload and walk it.
//!
//! cargo run --package rbmarshal --example session_read

use rbmarshal::{Document, Kind, to_json};

fn main() -> Result<(), rbmarshal::Error> {
    // Marshal.dump({"session_id" => "09b10", "user_id" => 42, "flash" => nil})
    let data: &[u8] = &[
        0x04, 0x08, 0x7B, 0x08, //
        0x49, 0x22, 0x0F, b's', b'e', b's', b's', b'i', b'o', b'n', b'_', b'i', b'd', 0x06, 0x3A,
        0x06, b'E', 0x54, //
        0x49, 0x22, 0x0A, b'0', b'9', b'b', b'1', b'0', 0x06, 0x3B, 0x00, 0x54, //
        0x49, 0x22, 0x0C, b'u', b's', b'e', b'r', b'_', b'i', b'd', 0x06, 0x3B, 0x00, 0x54, //
        0x69, 0x2F, //
        0x49, 0x22, 0x0A, b'f', b'l', b'a', b's', b'h', 0x06, 0x3B, 0x00, 0x54, //
        0x30,
    ];

    let mut doc = Document::from_slice(data)?;
    let root = doc.root();
    assert_eq!(doc.kind(root), Kind::Map);

    let session = doc.as_map(root)?;
    let session_id = doc.as_string(session["session_id"])?;
    let user_id = doc.as_integer(session["user_id"])?;
    println!("session_id: {session_id}");
    println!("user_id:    {user_id}");

    println!("as json:    {}", to_json(&mut doc)?);
    Ok(())
}
