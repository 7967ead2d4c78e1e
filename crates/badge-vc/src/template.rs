//! Default badge artwork for records issued without their own SVG.

use quick_xml::escape::escape;

const PALETTE: [&str; 6] = ["#e43717", "#2f6fde", "#1f9d55", "#8e44ad", "#d68910", "#117a8b"];

/// Render a 400x400 SVG medal showing the achievement and conference names.
///
/// The accent colour is picked from the achievement name, so one achievement
/// always renders the same.
pub fn render_badge_svg(achievement: &str, conference: &str, recipient: Option<&str>) -> String {
    let accent = PALETTE[achievement.bytes().map(usize::from).sum::<usize>() % PALETTE.len()];
    let recipient_line = recipient
        .map(|name| {
            format!(
                "\n  <text x=\"200\" y=\"300\" font-size=\"18\" text-anchor=\"middle\" fill=\"#333\">{}</text>",
                escape(name)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400" viewBox="0 0 400 400">
  <circle cx="200" cy="200" r="190" fill="{accent}"/>
  <circle cx="200" cy="200" r="160" fill="#ffffff"/>
  <text x="200" y="150" font-size="20" text-anchor="middle" fill="{accent}">{conference}</text>
  <text x="200" y="215" font-size="34" font-weight="bold" text-anchor="middle" fill="#111">{achievement}</text>{recipient_line}
</svg>"##,
        conference = escape(conference),
        achievement = escape(achievement),
    )
}
