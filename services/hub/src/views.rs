//! HTML pages
//!
//! Everything user-supplied passes through [`escape`] before it is
//! interpolated.

use crate::{
    flash::Flash,
    models::{Material, Message, User},
};

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, flash: Option<&Flash>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<span class="who">Signed in as {}</span> <a href="/study-hub">Study Hub</a> <a href="/logout">Log out</a>"#,
            escape(user.display_name())
        ),
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };

    let notice = match flash {
        Some(flash) => format!(
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Study Hub</title>
</head>
<body>
<nav><a href="/">Home</a> {nav}</nav>
{notice}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn index(user: Option<&User>, flash: Option<&Flash>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"<h1>Welcome back, {}!</h1>
<p><a href="/study-hub">Go to the Study Hub</a> to chat and share materials.</p>"#,
            escape(user.display_name())
        ),
        None => r#"<h1>Study Hub</h1>
<p>Chat with your study group and share notes in one place.</p>
<p><a href="/register">Create an account</a> or <a href="/login">log in</a>.</p>"#
            .to_string(),
    };
    layout("Home", user, flash, &body)
}

pub fn register(flash: Option<&Flash>) -> String {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Name <input type="text" name="name"></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Create account</button>
</form>"#;
    layout("Register", None, flash, body)
}

pub fn login(flash: Option<&Flash>) -> String {
    let body = r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#;
    layout("Log in", None, flash, body)
}

fn chat_line(message: &Message) -> String {
    format!(
        r#"<li><span class="time">{}</span> <strong>{}</strong>: {}</li>"#,
        message.display_time(),
        escape(&message.sender_name),
        escape(&message.content)
    )
}

fn material_row(material: &Material) -> String {
    format!(
        r#"<li><a href="{}">{}</a> <span class="by">uploaded by {} at {}</span></li>"#,
        escape(&material.file_url),
        escape(&material.original_filename),
        escape(&material.uploader_name),
        material.created_at.format("%Y-%m-%d %H:%M UTC")
    )
}

const CHAT_SCRIPT: &str = r#"<script>
(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(proto + location.host + "/ws");
  var log = document.getElementById("chat-log");
  socket.onmessage = function (frame) {
    var event = JSON.parse(frame.data);
    if (event.event !== "new_message") { return; }
    var li = document.createElement("li");
    var time = document.createElement("span");
    time.className = "time";
    time.textContent = event.data.time;
    var who = document.createElement("strong");
    who.textContent = event.data.sender;
    li.appendChild(time);
    li.appendChild(document.createTextNode(" "));
    li.appendChild(who);
    li.appendChild(document.createTextNode(": " + event.data.content));
    log.appendChild(li);
  };
  document.getElementById("chat-form").addEventListener("submit", function (e) {
    e.preventDefault();
    var input = document.getElementById("chat-input");
    socket.send(JSON.stringify({ event: "send_message", data: { message: input.value } }));
    input.value = "";
  });
})();
</script>"#;

pub fn hub(
    user: &User,
    messages: &[Message],
    materials: &[Material],
    flash: Option<&Flash>,
) -> String {
    let chat: String = messages.iter().map(chat_line).collect();
    let files: String = if materials.is_empty() {
        "<li>No materials yet.</li>".to_string()
    } else {
        materials.iter().map(material_row).collect()
    };

    let body = format!(
        r#"<h1>Study Hub</h1>
<section id="chat">
<h2>Group chat</h2>
<ul id="chat-log">{chat}</ul>
<form id="chat-form">
<input id="chat-input" type="text" autocomplete="off">
<button type="submit">Send</button>
</form>
</section>
<section id="materials">
<h2>Study materials</h2>
<form method="post" action="/study-hub" enctype="multipart/form-data">
<input type="file" name="study_file">
<button type="submit">Upload</button>
</form>
<ul id="material-list">{files}</ul>
</section>
{CHAT_SCRIPT}"#
    );
    layout("Study Hub", Some(user), flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashLevel;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn alice() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Alice".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
    }

    #[test]
    fn test_index_shows_identity() {
        let html = index(Some(&alice()), None);
        assert!(html.contains("Welcome back, Alice!"));
        assert!(index(None, None).contains("Create an account"));
    }

    #[test]
    fn test_flash_is_rendered_escaped() {
        let flash = Flash::new(FlashLevel::Error, "<b>nope</b>");
        let html = login(Some(&flash));
        assert!(html.contains(r#"class="flash flash-error""#));
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
    }

    #[test]
    fn test_hub_lists_messages_and_materials() {
        let user = alice();
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: user.id,
            sender_name: "Alice".to_string(),
            content: "<hello>".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 0).unwrap(),
        };
        let material = Material {
            id: Uuid::new_v4(),
            uploader_id: user.id,
            uploader_name: "Alice".to_string(),
            original_filename: "notes.PDF".to_string(),
            stored_filename: "notes.PDF".to_string(),
            file_url: "/static/study_materials/notes.PDF".to_string(),
            created_at: Utc::now(),
        };

        let html = hub(&user, &[message], &[material], None);
        assert!(html.contains("09:07"));
        assert!(html.contains("&lt;hello&gt;"));
        assert!(html.contains(r#"href="/static/study_materials/notes.PDF""#));
        assert!(html.contains(r#"name="study_file""#));
    }
}
