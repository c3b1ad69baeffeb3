use common::editor::dom::ParsedDocument;
use common::editor::recovery::MemoryRecoveryStore;
use common::editor::{extract, Edit, EditOutcome, EditSession, SaveStatus};
use common::model::editable::ElementKind;
use common::model::service_block::ServiceBlock;
use common::model::site::GeneratedSite;
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <title>Panadería Acme</title>
  <style>body { font-family: sans-serif; }</style>
</head>
<body>
  <header class="hero" style="min-height: 60vh; background-image: url('/img/hero.jpg'); background-position: center">
    <nav><a href="/contacto">Reservar mesa</a></nav>
    <h1>Welcome</h1>
    <p class="tagline">Pan recién horneado cada mañana</p>
  </header>
  <section id="services">
    <h2>Nuestros servicios</h2>
    <div class="grid">
      <div class="service-item">
        <span class="service-icon">🥖</span>
        <h3>Pan artesanal</h3>
        <p>Masa madre y harinas locales.</p>
      </div>
    </div>
  </section>
  <section id="about">
    <img src="/a.png" alt="Logo">
    <p>Desde 1987 en el barrio.</p>
  </section>
  <footer><button>Llámanos</button></footer>
  <script>document.querySelector('nav a').addEventListener('click', function () {});</script>
</body>
</html>"#;

fn site() -> GeneratedSite {
    GeneratedSite {
        html_content: PAGE.to_string(),
        file_path: "sites/acme.html".to_string(),
    }
}

fn session() -> EditSession<MemoryRecoveryStore> {
    EditSession::mount(site(), MemoryRecoveryStore::new())
}

fn snapshot(session: &mut EditSession<MemoryRecoveryStore>) -> Vec<(String, ElementKind, String)> {
    session
        .catalog()
        .iter()
        .map(|entry| (entry.id.clone(), entry.kind, entry.content.clone()))
        .collect()
}

fn id_of(session: &mut EditSession<MemoryRecoveryStore>, content: &str) -> String {
    session
        .catalog()
        .iter()
        .find(|entry| entry.content == content)
        .map(|entry| entry.id.clone())
        .expect("catalog entry")
}

fn normalized(document: &str) -> String {
    ParsedDocument::parse(document)
        .serialize()
        .expect("serializable")
}

#[test]
fn fixture_catalog_covers_every_kind() {
    let mut session = session();
    let kinds: Vec<ElementKind> = session.catalog().iter().map(|entry| entry.kind).collect();
    for kind in [
        ElementKind::Text,
        ElementKind::Image,
        ElementKind::BackgroundImage,
        ElementKind::ServiceContainer,
    ] {
        assert!(kinds.contains(&kind), "missing {}", kind);
    }
}

#[test]
fn submitting_current_values_changes_nothing() {
    let mut session = session();
    let before = snapshot(&mut session);
    let entries = session.catalog().entries().to_vec();

    for entry in entries {
        let edit = match entry.kind {
            ElementKind::Text => Edit::Text(entry.content.clone()),
            ElementKind::Image => Edit::Image(entry.content.clone()),
            ElementKind::BackgroundImage => Edit::BackgroundImage(entry.content.clone()),
            ElementKind::ServiceContainer => continue,
        };
        assert_eq!(
            session.submit_edit(&entry.id, edit),
            Ok(EditOutcome::Unchanged),
            "{}",
            entry.display_name
        );
    }

    assert_eq!(snapshot(&mut session), before);
    assert!(!session.is_dirty());
}

#[test]
fn extraction_is_stable_for_the_same_document() {
    let tuples = |document: &str| -> Vec<(ElementKind, String, String)> {
        extract(document)
            .catalog
            .iter()
            .map(|entry| (entry.kind, entry.content.clone(), entry.display_name.clone()))
            .collect()
    };

    assert_eq!(tuples(PAGE), tuples(PAGE));
    let annotated = extract(PAGE).document;
    assert_eq!(tuples(&annotated), tuples(PAGE));
}

#[test]
fn editing_one_text_leaves_the_others_alone() {
    let mut session = session();
    let before = snapshot(&mut session);
    let target = id_of(&mut session, "Pan recién horneado cada mañana");

    session
        .submit_edit(&target, Edit::Text("Bollería y café".into()))
        .expect("edit");

    let after = snapshot(&mut session);
    assert_eq!(after.len(), before.len());
    for ((id, kind, content), (id_after, kind_after, content_after)) in before.iter().zip(&after) {
        assert_eq!(id, id_after);
        assert_eq!(kind, kind_after);
        if *id == target {
            assert_eq!(content_after, "Bollería y café");
        } else {
            assert_eq!(content, content_after);
        }
    }
}

#[test]
fn background_edit_keeps_other_declarations() {
    let mut session = session();
    let id = id_of(&mut session, "/img/hero.jpg");

    session
        .submit_edit(&id, Edit::BackgroundImage("/img/summer.jpg".into()))
        .expect("edit");

    assert!(session.working_document().contains(
        "style=\"min-height: 60vh; background-image: url('/img/summer.jpg'); background-position: center\""
    ));
    assert!(!session.working_document().contains("/img/hero.jpg"));
}

#[test]
fn reset_restores_the_baseline() {
    let mut session = session();
    let heading = id_of(&mut session, "Welcome");
    let logo = id_of(&mut session, "/a.png");
    let services = id_of(&mut session, "services");

    session.submit_edit(&heading, Edit::Text("Hola".into())).expect("edit");
    session.submit_edit(&logo, Edit::Image("/b.png".into())).expect("edit");
    session
        .submit_edit(
            &services,
            Edit::AppendService(ServiceBlock {
                icon: "☕".into(),
                title: "Cafetería".into(),
                description: "Café de especialidad.".into(),
            }),
        )
        .expect("edit");
    assert!(session.is_dirty());

    assert!(session.reset(|| true));
    assert_eq!(
        normalized(session.working_document()),
        normalized(session.original_document())
    );
    assert!(!session.is_dirty());
}

#[test]
fn ambiguous_text_is_left_untouched() {
    let html = "<html><head></head><body><p>Contact us</p><main><p>Contact us</p></main></body></html>";
    let mut session = EditSession::mount(
        GeneratedSite {
            html_content: html.to_string(),
            file_path: String::new(),
        },
        MemoryRecoveryStore::new(),
    );
    let ids: Vec<String> = session.catalog().iter().map(|entry| entry.id.clone()).collect();
    assert_eq!(ids.len(), 2);

    for id in ids {
        assert_eq!(
            session.submit_edit(&id, Edit::Text("Write to us".into())),
            Ok(EditOutcome::Unchanged)
        );
        assert_eq!(session.working_document(), html);
    }
}

#[test]
fn text_inside_inline_markup_is_editable() {
    let html = "<html><head></head><body><p><strong>Important notice</strong></p><ul><li><em>Delivery</em></li></ul></body></html>";
    let mut session = EditSession::mount(
        GeneratedSite {
            html_content: html.to_string(),
            file_path: String::new(),
        },
        MemoryRecoveryStore::new(),
    );
    let notice = id_of(&mut session, "Important notice");
    let delivery = id_of(&mut session, "Delivery");

    assert_eq!(
        session.submit_edit(&notice, Edit::Text("Closed on Monday".into())),
        Ok(EditOutcome::Applied)
    );
    assert_eq!(
        session.submit_edit(&delivery, Edit::Text("Pickup".into())),
        Ok(EditOutcome::Applied)
    );
    assert!(session.working_document().contains("<p>Closed on Monday</p>"));
    assert!(session.working_document().contains("<li>Pickup</li>"));
}

#[test]
fn nested_same_tag_text_stays_inert() {
    let html = "<html><head></head><body><div class=\"card\"><div>Hello there</div></div></body></html>";
    let mut session = EditSession::mount(
        GeneratedSite {
            html_content: html.to_string(),
            file_path: String::new(),
        },
        MemoryRecoveryStore::new(),
    );
    let ids: Vec<String> = session.catalog().iter().map(|entry| entry.id.clone()).collect();
    assert_eq!(ids.len(), 2);

    for id in ids {
        assert_eq!(
            session.submit_edit(&id, Edit::Text("Bye".into())),
            Ok(EditOutcome::Unchanged)
        );
    }
    assert_eq!(session.working_document(), html);
}

#[test]
fn heading_edit_scenario() {
    let mut session = session();
    let matches: Vec<_> = session
        .catalog()
        .iter()
        .filter(|entry| entry.kind == ElementKind::Text && entry.content == "Welcome")
        .map(|entry| entry.id.clone())
        .collect();
    assert_eq!(matches.len(), 1);

    let before = session.working_document().to_string();
    session
        .submit_edit(&matches[0], Edit::Text("Welcome to Acme".into()))
        .expect("edit");

    let after = session.working_document();
    assert!(after.contains("<h1>Welcome to Acme</h1>"));
    assert_eq!(
        normalized(&before).replace("<h1>Welcome</h1>", "<h1>Welcome to Acme</h1>"),
        normalized(after)
    );
}

#[test]
fn image_swap_scenario() {
    let mut session = session();
    let id = id_of(&mut session, "/a.png");

    session.submit_edit(&id, Edit::Image("/b.png".into())).expect("edit");

    let entry = session.catalog().get(&id).cloned().expect("same id after edit");
    assert_eq!(entry.content, "/b.png");
    assert_eq!(entry.display_name, "Logo");
    assert!(!session.working_document().contains("/a.png"));
}

#[test]
fn failed_save_keeps_every_edit() {
    let mut session = session();
    let original = session.original_document().to_string();
    let heading = id_of(&mut session, "Welcome");
    let tagline = id_of(&mut session, "Pan recién horneado cada mañana");
    let logo = id_of(&mut session, "/a.png");

    session.submit_edit(&heading, Edit::Text("Uno".into())).expect("edit");
    session.submit_edit(&tagline, Edit::Text("Dos".into())).expect("edit");
    session.submit_edit(&logo, Edit::Image("/tres.png".into())).expect("edit");

    session
        .save_with(|_| Err("disk full".to_string()))
        .expect("save attempted");

    let working = session.working_document();
    assert!(working.contains("<h1>Uno</h1>"));
    assert!(working.contains(">Dos</p>"));
    assert!(working.contains("/tres.png"));
    assert_eq!(session.save_status(), &SaveStatus::Error("disk full".into()));
    assert_eq!(session.original_document(), original);
}
