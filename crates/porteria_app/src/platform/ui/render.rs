use porteria_core::{PhotoView, SessionView};

pub fn render(view: &SessionView) -> Vec<String> {
    let mut lines = Vec::new();

    if !view.result_message.is_empty() {
        let marker = if view.result_ok { "ok" } else { "error" };
        lines.push(format!("[{marker}] {}", view.result_message));
    }

    if !view.name.is_empty() || !view.dni.is_empty() {
        lines.push(format!("  Name: {}", view.name));
        lines.push(format!("  DNI:  {}", view.dni));
        if !view.last_legajo.is_empty() {
            lines.push(format!("  Legajo: {}", view.last_legajo));
        }
    }

    if let Some(photo) = photo_line(&view.photo) {
        lines.push(format!("  Photo: {photo}"));
    }

    lines.push(format!(
        "  Token field: {}",
        if view.pending_token.is_empty() {
            "(empty)"
        } else {
            view.pending_token.as_str()
        }
    ));
    lines.push(format!(
        "  API URL: {}",
        if view.api_url.is_empty() {
            "(not configured)"
        } else {
            view.api_url.as_str()
        }
    ));

    if view.scan_in_flight {
        lines.push("  Scanning... type `stop` to cancel.".to_string());
    }
    if view.lookup_in_flight {
        lines.push("  Waiting for the directory...".to_string());
    }

    lines
}

fn photo_line(photo: &PhotoView) -> Option<String> {
    match photo {
        PhotoView::None => None,
        PhotoView::Unavailable => Some("none on record".to_string()),
        PhotoView::Loading { url } => Some(format!("loading {url}")),
        PhotoView::Loaded { bytes, .. } => {
            let format = image::guess_format(bytes)
                .map(|format| format!("{format:?}"))
                .unwrap_or_else(|_| "unknown format".to_string());
            Some(format!("loaded ({format}, {} bytes)", bytes.len()))
        }
        PhotoView::Failed { reason, .. } => Some(format!("could not be loaded ({reason})")),
    }
}
