//! Minimal server-rendered HTML. Pages are plain strings around a shared layout; all
//! applicant- or catalog-provided text goes through [`escape`].

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::workflows::hiring::catalog::{PositionCatalog, PositionRecord};

pub struct Company {
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
}

pub const COMPANY: Company = Company {
    name: "CoreCrew Logistics",
    email: "corecrewlogistics@gmail.com",
    phone: "+13105742415",
    address: "4700 Stockdale Hwy, Bakersfield, CA 93309",
};

pub const SITE_URL: &str = "https://www.corecrewlogistics.com";

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | {company}</title>\n</head>\n<body>\n\
         <header><nav><a href=\"/\">Home</a> <a href=\"/about\">About</a> \
         <a href=\"/services\">Services</a> <a href=\"/jobs\">Jobs</a> \
         <a href=\"/apply\">Apply</a> <a href=\"/contact\">Contact</a></nav></header>\n\
         <main>\n{body}\n</main>\n<footer>{footer}</footer>\n</body>\n</html>\n",
        title = escape(title),
        company = COMPANY.name,
        footer = contact_block(),
    )
}

fn contact_block() -> String {
    format!(
        "<address>{} &middot; <a href=\"mailto:{email}\">{email}</a> &middot; \
         <a href=\"tel:{phone}\">{phone}</a> &middot; {}</address>",
        COMPANY.name,
        escape(COMPANY.address),
        email = COMPANY.email,
        phone = COMPANY.phone,
    )
}

/// Render `messages` as an alert list; empty input renders nothing.
pub fn message_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();
    format!("<ul class=\"errors\" role=\"alert\">{items}</ul>")
}

pub fn page(status: StatusCode, title: &str, body: &str) -> Response {
    (status, Html(layout(title, body))).into_response()
}

pub fn error_page(status: StatusCode, messages: &[String]) -> Response {
    let body = format!(
        "<h1>Something went wrong</h1>\n{}\n<p><a href=\"/apply\">Back to the application</a></p>",
        message_list(messages)
    );
    page(status, "Error", &body)
}

pub fn landing(catalog: &PositionCatalog) -> String {
    let featured: String = catalog
        .positions()
        .iter()
        .take(4)
        .map(position_card)
        .collect();
    let body = format!(
        "<h1>{}</h1>\n<p>Staffing for logistics, warehousing, fleet and support teams.</p>\n\
         <p><a href=\"/apply\">Start your application</a></p>\n\
         <section><h2>Open positions</h2>{featured}<p><a href=\"/jobs\">All jobs</a></p></section>\n\
         <section><h2>Stay in touch</h2>\
         <form method=\"post\" action=\"/newsletter\">\
         <input type=\"email\" name=\"email\" required placeholder=\"you@example.com\">\
         <button type=\"submit\">Subscribe</button></form></section>",
        COMPANY.name
    );
    layout("Home", &body)
}

fn position_card(position: &PositionRecord) -> String {
    format!(
        "<article><h3><a href=\"/jobs/{key}\">{title}</a></h3>\
         <p>{location} &middot; {kind} &middot; {pay}</p></article>",
        key = escape(position.key),
        title = escape(position.title),
        location = escape(position.location),
        kind = escape(position.employment_type),
        pay = escape(position.pay),
    )
}

pub fn jobs_index(catalog: &PositionCatalog) -> String {
    let cards: String = catalog.positions().iter().map(position_card).collect();
    layout("Jobs", &format!("<h1>Open positions</h1>\n{cards}"))
}

pub fn job_detail(position: &PositionRecord) -> String {
    let benefits: String = position
        .benefits
        .iter()
        .map(|benefit| format!("<li>{}</li>", escape(benefit)))
        .collect();
    let body = format!(
        "<h1>{title}</h1>\n<p>{category} &middot; posted {posted} &middot; {applicants} applicants</p>\n\
         <p>{description}</p>\n<dl><dt>Location</dt><dd>{location}</dd>\
         <dt>Type</dt><dd>{kind}</dd><dt>Pay</dt><dd>{pay}</dd>\
         <dt>Experience</dt><dd>{experience}</dd></dl>\n<h2>Benefits</h2><ul>{benefits}</ul>\n\
         <p><a href=\"/apply?position={key}\">Apply for this position</a></p>",
        title = escape(position.title),
        category = escape(position.category),
        posted = escape(position.posted),
        applicants = position.applicants,
        description = escape(position.description),
        location = escape(position.location),
        kind = escape(position.employment_type),
        pay = escape(position.pay),
        experience = escape(position.experience),
        key = escape(position.key),
    );
    layout(position.title, &body)
}

pub fn about() -> String {
    let body = format!(
        "<h1>About {name}</h1>\n\
         <p>{name} places vetted people in logistics, warehousing, fleet and office roles \
         for carriers and distribution centers across Kern County and beyond.</p>\n\
         <p>Every applicant goes through a short role-specific interview and an identity \
         check before we introduce them to a client.</p>\n\
         <p><a href=\"/jobs\">See open positions</a> or <a href=\"/contact\">get in touch</a>.</p>",
        name = COMPANY.name,
    );
    layout("About", &body)
}

/// One section per catalog category, listing the roles staffed under it.
pub fn services(catalog: &PositionCatalog) -> String {
    let mut categories: Vec<&'static str> = Vec::new();
    for position in catalog.positions() {
        if !categories.contains(&position.category) {
            categories.push(position.category);
        }
    }

    let sections: String = categories
        .into_iter()
        .map(|category| {
            let roles: String = catalog
                .positions()
                .iter()
                .filter(|position| position.category == category)
                .map(|position| {
                    format!(
                        "<li><a href=\"/jobs/{}\">{}</a></li>",
                        escape(position.key),
                        escape(position.title)
                    )
                })
                .collect();
            format!("<section><h2>{}</h2><ul>{roles}</ul></section>", escape(category))
        })
        .collect();
    layout(
        "Services",
        &format!("<h1>Staffing services</h1>\n{sections}\n<p><a href=\"/contact\">Request staff</a></p>"),
    )
}

pub fn contact(sent: bool) -> String {
    let notice = if sent {
        "<p role=\"status\">Thanks, your message has been sent.</p>"
    } else {
        ""
    };
    let body = format!(
        "<h1>Contact us</h1>\n{notice}\n\
         <form method=\"post\" action=\"/contact\">\
         <label>Name <input name=\"name\" required></label>\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Subject <input name=\"subject\"></label>\
         <label>Message <textarea name=\"message\" required></textarea></label>\
         <button type=\"submit\">Send</button></form>\n{}",
        contact_block()
    );
    layout("Contact", &body)
}

pub fn not_found() -> Response {
    page(
        StatusCode::NOT_FOUND,
        "Not found",
        "<h1>Page not found</h1><p><a href=\"/jobs\">Browse open positions</a></p>",
    )
}

pub fn robots_txt() -> String {
    format!("User-agent: *\nAllow: /\nSitemap: {SITE_URL}/sitemap.xml\n")
}

pub fn sitemap_xml(catalog: &PositionCatalog) -> String {
    let mut urls = vec![
        (String::from("/"), "1.0"),
        (String::from("/apply"), "0.9"),
        (String::from("/jobs"), "0.8"),
        (String::from("/about"), "0.5"),
        (String::from("/services"), "0.5"),
    ];
    urls.extend(
        catalog
            .positions()
            .iter()
            .map(|position| (format!("/jobs/{}", position.key), "0.7")),
    );

    let entries: String = urls
        .into_iter()
        .map(|(path, priority)| {
            format!(
                "  <url>\n    <loc>{SITE_URL}{}</loc>\n    <changefreq>weekly</changefreq>\n    \
                 <priority>{priority}</priority>\n  </url>\n",
                escape(&path)
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>\n"
    )
}
