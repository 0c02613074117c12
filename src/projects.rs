//! Project showcase data and card markup.

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub live_link: String,
    pub repo_link: String,
}

impl Project {
    fn new(title: &str, description: &str, tech: &[&str]) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            tech: tech.iter().map(|tag| (*tag).to_owned()).collect(),
            live_link: "#".to_owned(),
            repo_link: "#".to_owned(),
        }
    }
}

/// The projects rendered into `.projects-grid`.
pub fn default_projects() -> Vec<Project> {
    vec![
        Project::new(
            "Detective Conan News Bot",
            "A production-grade Telegram bot that automatically scrapes and distributes anime \
             news with 24/7 uptime. Features automated news collection, user notifications, and \
             robust error handling for continuous operation.",
            &["Python", "Telegram API", "Web Scraping", "24/7 Deployment"],
        ),
        Project::new(
            "Property Management Web Application",
            "Full-stack MERN application for comprehensive property management with user \
             authentication, property listings, advanced search filters, and admin dashboard. \
             Deployed on Render with PostgreSQL database.",
            &["React", "Node.js", "Express", "PostgreSQL"],
        ),
        Project::new(
            "Resume Builder Web Application",
            "Interactive resume creation and management tool built with MERN stack. Features \
             real-time preview, multiple templates, PDF export, and cloud storage integration \
             for seamless resume building experience.",
            &["MERN Stack", "MongoDB", "PDF Generation", "Vercel"],
        ),
        Project::new(
            "Web Scraping Automation Suite",
            "Collection of sophisticated automation tools for data collection and processing \
             using Python. Includes news aggregation bots, data mining tools, and automated \
             monitoring systems with Selenium and BeautifulSoup.",
            &["Python", "Selenium", "BeautifulSoup", "Automation"],
        ),
    ]
}

/// Inner markup of the `<article class="project-card">` for the project at `index`.
pub fn render_card_html(index: usize, project: &Project) -> String {
    let tags: String = project
        .tech
        .iter()
        .map(|tag| format!(r#"<span class="tech-tag">{}</span>"#, escape_html(tag)))
        .collect();

    format!(
        r#"<div class="project-number">{number:02}</div>
<div class="project-content">
    <h3 class="project-title">{title}</h3>
    <p class="project-description">{description}</p>
    <div class="project-tech">{tags}</div>
    <div class="project-links">
        <a href="{live}" class="project-link">View Project →</a>
        <a href="{repo}" class="project-link">GitHub →</a>
    </div>
</div>"#,
        number = index + 1,
        title = escape_html(&project.title),
        description = escape_html(&project.description),
        live = escape_html(&project.live_link),
        repo = escape_html(&project.repo_link),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
