//! Fixture site builder shared by the validator integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const PARTNERS: &[(&str, &str)] = &[
    ("itau", "Itaú"),
    ("bradesco", "Bradesco"),
    ("nubank", "Nubank"),
    ("inter", "Inter"),
];

const CONVERSATION: &str = r#"{ title: "Pix", messages: [ { from: "user", text: "Oi" } ] }"#;

/// A site directory on disk with an index document and its assets
pub struct Site {
    dir: TempDir,
}

impl Site {
    /// A site that satisfies every default expectation
    pub fn conforming() -> Self {
        Self::with_html(&conforming_html())
    }

    /// The conforming site's assets with a custom document
    pub fn with_html(html: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        write(root, "css/style.css", "body { background: url('../img/bg.png'); }");
        write(root, "img/bg.png", "png");
        write(root, "img/logo.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        write(root, "img/app.png", "png");
        for (slug, _) in PARTNERS {
            write(root, &format!("img/partners/{}.png", slug), "png");
        }
        write(root, "privacidade/index.html", "<html></html>");
        write(root, "termos/index.html", "<html></html>");
        write(root, "index.html", html);

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn index(&self) -> PathBuf {
        self.dir.path().join("index.html")
    }

    pub fn add_file(&self, relative: &str, content: &str) {
        write(self.dir.path(), relative, content);
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, content).expect("write fixture file");
}

fn feature_card(n: usize) -> String {
    format!(
        r#"<article class="feature-card">
          <span class="card-label">Recurso {n}</span>
          <h3 class="card-title">Funcionalidade {n}</h3>
          <p class="card-body">Descrição completa da funcionalidade {n}.</p>
          <ul><li class="card-tag">Pix</li><li class="card-tag">Boleto</li><li class="card-tag">Cartão</li></ul>
        </article>"#
    )
}

fn conversations(name: &str) -> String {
    let items = vec![CONVERSATION; 4].join(",\n      ");
    format!("const {} = [\n      {}\n    ];", name, items)
}

/// Markup meeting every default check
pub fn conforming_html() -> String {
    let cards: String = (1..=10).map(feature_card).collect();
    let faq: String = (1..=5)
        .map(|n| {
            format!(
                r#"<div class="faq-item"><button class="faq-question" onclick="toggleFaq(this)">Pergunta {n}</button><div class="faq-answer">Resposta {n}</div></div>"#
            )
        })
        .collect();
    let partners: String = PARTNERS
        .iter()
        .map(|(slug, alt)| format!(r#"<img src="img/partners/{slug}.png" alt="{alt}" width="120" height="40" loading="lazy">"#))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Exemplo Pagamentos: pagamentos simples para o seu negócio</title>
  <meta name="description" content="Receba pagamentos por Pix, boleto e cartão com uma única integração e conciliação automática.">
  <meta property="og:title" content="Exemplo Pagamentos: pagamentos simples">
  <meta property="og:description" content="Receba pagamentos por Pix, boleto e cartão com uma única integração e conciliação automática.">
  <meta property="og:type" content="website">
  <meta property="og:locale" content="pt_BR">
  <meta property="og:image" content="https://exemplo.com.br/og.png">
  <link rel="preconnect" href="https://fonts.googleapis.com">
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
  <link rel="stylesheet" href="css/style.css">
  <script src="https://cdn.jsdelivr.net/npm/lucide@0.300.0/dist/umd/lucide.min.js"></script>
</head>
<body>
  <header>
    <img src="img/logo.svg" alt="Exemplo Pagamentos">
    <nav>
      <a href="#features">Recursos</a>
      <a href="#how-it-works">Como funciona</a>
      <a href="#faq">Dúvidas</a>
      <a href="#contact">Contato</a>
    </nav>
  </header>
  <main>
    <section id="hero">
      <h1>A plataforma de pagamentos do seu negócio</h1>
      <div class="phone-mockup"><div id="chat-messages"></div></div>
      <div style="background-image: url('img/bg.png')"></div>
    </section>
    <section id="features">
      <button class="tab-btn">Empresas</button>
      <button class="tab-btn">Pessoas</button>
      {cards}
    </section>
    <section id="how-it-works">
      <span class="step-number">1</span>
      <span class="step-number">2</span>
      <span class="step-number">3</span>
      <img src="img/app.png" alt="Aplicativo" width="300" height="600" loading="lazy">
    </section>
    <section id="partners">{partners}</section>
    <section id="faq">{faq}</section>
    <section id="contact">
      <form>
        <input type="text" name="name">
        <input type="tel" name="phone">
        <button type="submit">Enviar</button>
      </form>
      <p>Ao enviar, você concorda com a nossa política de privacidade.</p>
    </section>
  </main>
  <footer>
    <a href="privacidade/">Política de Privacidade</a>
    <a href="termos/">Termos de Uso</a>
    <p>Exemplo Pagamentos S.A.</p>
    <p>CNPJ 12.345.678/0001-90</p>
  </footer>
  <script>
    const translations = {{
      pt: {{ hero_title: "pagamentos", hero_subtitle: "simples", nav_features: "Recursos", nav_faq: "Dúvidas", cta_button: "Começar" }},
      en: {{ hero_title: "payments", hero_subtitle: "simple", nav_features: "Features", nav_faq: "FAQ", cta_button: "Start" }}
    }};
    let currentLang = 'pt';
    let chatTimeout = null;
    const chatTimeouts = [];
    {pt}
    {en}
    function clearChatTimeouts() {{
      chatTimeouts.forEach(clearTimeout);
      chatTimeouts.length = 0;
    }}
    function startChat() {{
      clearChatTimeouts();
    }}
    const restartChat = () => startChat();
    function switchLang(code) {{
      currentLang = code;
      document.documentElement.lang = code === 'en' ? 'en' : 'pt-BR';
      restartChat();
    }}
    function toggleFaq(button) {{
      button.parentElement.classList.toggle('open');
    }}
  </script>
</body>
</html>
"##,
        cards = cards,
        partners = partners,
        faq = faq,
        pt = conversations("chatConversationsPt"),
        en = conversations("chatConversationsEn"),
    )
}
