//! Sample resume templates for testing and demonstration.
//!
//! They use the role classes the scanner recognises (`section-heading`,
//! `entry-header`, `bullet`, `skill-chip`) and name their adjustable
//! spacings with `data-gap`.

/// Single-column resume that fits on one page.
pub fn classic_template() -> &'static str {
    r##"
<div class="px-12 py-10">
    <header class="mb-6 border-b pb-4 border-gray-300">
        <h1 class="text-3xl font-bold" style="color: #1e3a8a">Jane Doe</h1>
        <p class="text-gray-600">Senior Software Engineer &middot; Berlin &middot; jane@example.com</p>
    </header>

    <section data-gap="summary">
        <h2 class="section-heading uppercase border-b border-gray-300 pb-1">Summary</h2>
        <p>Backend engineer with nine years of experience building payment and
        logistics systems. Enjoys turning slow batch jobs into streaming pipelines.</p>
    </section>

    <section data-gap="experience">
        <h2 class="section-heading uppercase border-b border-gray-300 pb-1">Experience</h2>

        <div class="mb-3">
            <div class="entry-header flex justify-between">
                <span class="font-bold">Staff Engineer, Acme Payments</span>
                <span class="text-gray-500">2020 &ndash; present</span>
            </div>
            <ul>
                <li class="bullet">Led the migration of settlement from nightly batches to event streams.</li>
                <li class="bullet">Cut reconciliation incidents by 70% with idempotent ledger writes.</li>
                <li class="bullet">Mentored six engineers through their first on-call rotations.</li>
            </ul>
        </div>

        <div class="mb-3">
            <div class="entry-header flex justify-between">
                <span class="font-bold">Software Engineer, Parcelly</span>
                <span class="text-gray-500">2016 &ndash; 2020</span>
            </div>
            <ul>
                <li class="bullet">Built the route planning service used by 300 depots.</li>
                <li class="bullet">Introduced contract tests between the dispatch and tracking teams.</li>
            </ul>
        </div>
    </section>

    <section data-gap="education">
        <h2 class="section-heading uppercase border-b border-gray-300 pb-1">Education</h2>
        <div class="entry-header flex justify-between">
            <span class="font-bold">B.Sc. Computer Science, TU Munich</span>
            <span class="text-gray-500">2012 &ndash; 2016</span>
        </div>
    </section>

    <section data-gap="skills">
        <h2 class="section-heading uppercase border-b border-gray-300 pb-1">Skills</h2>
        <div class="flex flex-wrap gap-2">
            <span class="skill-chip bg-blue-100 px-2">Rust</span>
            <span class="skill-chip bg-blue-100 px-2">PostgreSQL</span>
            <span class="skill-chip bg-blue-100 px-2">Kafka</span>
            <span class="skill-chip bg-blue-100 px-2">Kubernetes</span>
        </div>
    </section>
</div>
"##
}

/// Two-column layout: skills sidebar next to the experience column.
pub fn sidebar_template() -> &'static str {
    r##"
<div class="flex">
    <aside class="w-1/3 bg-gray-100 p-6">
        <h1 class="text-2xl font-bold">John Smith</h1>
        <p class="text-sm text-gray-600">Product Designer</p>
        <h2 class="section-heading text-sm uppercase mt-4">Tools</h2>
        <div class="flex flex-wrap gap-1">
            <span class="skill-chip text-xs">Figma</span>
            <span class="skill-chip text-xs">Sketch</span>
            <span class="skill-chip text-xs">Framer</span>
        </div>
    </aside>
    <main class="flex-1 p-6" data-gap="main">
        <h2 class="section-heading uppercase">Experience</h2>
        <div class="entry-header">
            <h3>Lead Designer, Northwind</h3>
            <p class="text-sm text-gray-500">2019 &ndash; 2024</p>
        </div>
        <p class="desc-line">Redesigned the onboarding flow, raising activation by 18%.</p>
        <p class="desc-line">Built and documented the company design system.</p>
    </main>
</div>
"##
}

/// Long resume that spans several pages.
pub fn long_template() -> String {
    let mut html = String::from(
        r##"<div class="px-12 py-10">
    <h1 class="text-3xl font-bold mb-4">Alex Example</h1>
    <section data-gap="experience">
    <h2 class="section-heading uppercase border-b pb-1">Experience</h2>
"##,
    );
    for i in 0..14 {
        html.push_str(&format!(
            r##"    <div class="mb-4">
        <div class="entry-header flex justify-between">
            <span class="font-bold">Engineer {n}, Company {n}</span>
            <span>{start} &ndash; {end}</span>
        </div>
        <ul>
            <li class="bullet">Owned the service boundary between billing and fulfilment for team {n}.</li>
            <li class="bullet">Reduced p99 latency of the order API from 800ms to 120ms by batching lookups.</li>
            <li class="bullet">Wrote the incident review process later adopted across the engineering organisation.</li>
            <li class="bullet">Paired with product on quarterly planning and capacity estimates.</li>
        </ul>
    </div>
"##,
            n = i + 1,
            start = 1990 + i * 2,
            end = 1992 + i * 2,
        ));
    }
    html.push_str("    </section>\n</div>\n");
    html
}

/// A template with no atomic units at all.
pub fn empty_template() -> &'static str {
    r#"<div class="p-10"></div>"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn templates_parse() {
        for html in [classic_template(), sidebar_template(), empty_template()] {
            assert!(!parse_html(html).is_empty());
        }
        assert!(!parse_html(&long_template()).is_empty());
    }

    #[test]
    fn long_template_has_every_entry() {
        let html = long_template();
        assert_eq!(html.matches("entry-header").count(), 14);
        assert_eq!(html.matches("class=\"bullet\"").count(), 56);
    }
}
