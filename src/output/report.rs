use super::{CardRecord, PageRecord};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_card(card: &CardRecord) -> String {
    let types = card
        .categories
        .iter()
        .map(|t| {
            let t = escape_html(t);
            format!(
                r#"      <div class="card__type {t}">
        <img src="img/types/{t}.svg" title="{t}" alt="{t}"/>
        <div>{t}</div>
      </div>
"#
            )
        })
        .collect::<String>();

    // a broken sprite only hides the image, the rest of the card still renders
    format!(
        r#"  <div class="card" data-id="{id}">
    <div class="card__id">{label}</div>
    <div class="card__img">
      <img src="{sprite}" alt="{name}" loading="lazy" onload="this.classList.add('loaded')" onerror="this.style.visibility='hidden'">
    </div>
    <div class="card__name">{name}</div>
    <div class="card__types">
{types}    </div>
  </div>
"#,
        id = card.id,
        label = escape_html(&card.label),
        sprite = escape_html(&card.sprite_url),
        name = escape_html(&card.name),
        types = types,
    )
}

fn render_button(id: &str, label: &str, disabled: bool) -> String {
    let disabled = if disabled { " disabled" } else { "" };
    format!("    <button id=\"{id}\" class=\"pagination__button\"{disabled}>{label}</button>\n")
}

pub fn render_html(record: &PageRecord) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("<div class=\"list-wrapper\">\n");
    match record.message.as_deref() {
        Some(message) => {
            out.push_str(&format!(
                "  <p class=\"list-wrapper__empty\">{}</p>\n",
                escape_html(message)
            ));
        }
        None => {
            for card in record.cards.iter() {
                out.push_str(&render_card(card));
            }
        }
    }
    out.push_str("</div>\n");

    let p = &record.pagination;
    out.push_str("<nav class=\"pagination\">\n");
    out.push_str(&render_button("firstButton", "&laquo;", p.first_disabled));
    out.push_str(&render_button("prevButton", "&lsaquo;", p.prev_disabled));
    out.push_str(&format!(
        "    <span id=\"pageInfo\">Page {} of {}</span>\n",
        p.current_page, p.total_pages
    ));
    out.push_str(&format!(
        "    <input id=\"pageInput\" type=\"number\" min=\"1\" max=\"{}\" value=\"{}\">\n",
        p.total_pages, p.current_page
    ));
    out.push_str(&render_button("nextButton", "&rsaquo;", p.next_disabled));
    out.push_str(&render_button("lastButton", "&raquo;", p.last_disabled));
    out.push_str("</nav>\n");
    out.into_bytes()
}
