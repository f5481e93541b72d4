//! Single-page chat UI served at `/`

/// Chat page: language selectors, model controls, input box and history.
/// Talks to the JSON API under `/api/`.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Lingo-Voice</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; }
    aside { width: 260px; padding: 1rem; background: #f5f5f5; }
    main { flex: 1; padding: 1rem 2rem; }
    label { display: block; margin-top: 0.8rem; font-size: 0.85rem; }
    select, textarea, button { width: 100%; margin-top: 0.3rem; font: inherit; }
    textarea { height: 6rem; }
    .columns { display: flex; gap: 1rem; }
    .columns > div { flex: 1; }
    .status { margin-top: 1rem; font-size: 0.85rem; }
    .error { color: #b00020; min-height: 1.2rem; }
    .exchange { display: flex; gap: 1rem; border-bottom: 1px solid #ddd; padding: 0.6rem 0; }
    .exchange > div { flex: 1; white-space: pre-wrap; }
    .user { background: #e3f2fd; padding: 0.5rem; border-radius: 6px; }
    .assistant { background: #f3e5f5; padding: 0.5rem; border-radius: 6px; }
    footer { margin-top: 2rem; color: gray; font-size: 0.8rem; text-align: center; }
  </style>
</head>
<body>
  <aside>
    <h3>Settings</h3>
    <label for="source">Source language</label>
    <select id="source"></select>
    <label for="target">Target language</label>
    <select id="target"></select>
    <button id="load">Load model</button>
    <button id="clear">Clear chat history</button>
    <div class="status" id="status"></div>
  </aside>
  <main>
    <h1>Lingo-Voice</h1>
    <div class="columns">
      <div>
        <h4 id="source-title"></h4>
        <textarea id="input" placeholder="Type your message"></textarea>
      </div>
      <div>
        <h4 id="target-title"></h4>
        <textarea id="output" readonly></textarea>
      </div>
    </div>
    <button id="translate">Translate</button>
    <div class="error" id="error"></div>
    <h3>Chat history</h3>
    <div id="history"></div>
    <footer>Powered by NLLB-200</footer>
  </main>
  <script>
    const $ = (id) => document.getElementById(id);

    async function call(method, path, body) {
      const res = await fetch(path, {
        method,
        headers: body ? { "Content-Type": "application/json" } : {},
        body: body ? JSON.stringify(body) : undefined,
      });
      const data = await res.json().catch(() => ({}));
      if (!res.ok) {
        throw new Error((data.error && data.error.message) || res.statusText);
      }
      return data;
    }

    function showError(err) {
      $("error").textContent = err ? err.message : "";
    }

    function render(session) {
      $("source").value = session.source_lang.code;
      $("target").value = session.target_lang.code;
      $("source-title").textContent = session.source_lang.name;
      $("target-title").textContent = session.target_lang.name;
      $("status").textContent = session.model_loaded
        ? "Model ready: " + session.model_name
        : session.phase === "translating"
          ? "Loading / translating..."
          : "Model not loaded yet (" + session.model_id + ")";

      const history = $("history");
      history.replaceChildren();
      for (const exchange of session.history) {
        const row = document.createElement("div");
        row.className = "exchange";
        for (const turn of [exchange.user, exchange.assistant]) {
          const cell = document.createElement("div");
          cell.className = turn.role;
          const title = document.createElement("strong");
          title.textContent = turn.role === "user" ? turn.source_lang : turn.target_lang;
          cell.append(title, document.createElement("br"), turn.text);
          row.append(cell);
        }
        history.append(row);
      }
    }

    async function refresh() {
      render(await call("GET", "/api/session"));
    }

    async function init() {
      const languages = await call("GET", "/api/languages");
      for (const select of [$("source"), $("target")]) {
        for (const lang of languages.data) {
          select.append(new Option(lang.name + " (" + lang.code + ")", lang.code));
        }
      }
      await refresh();
    }

    async function select() {
      try {
        await call("PUT", "/api/session/languages", {
          source_lang: $("source").value,
          target_lang: $("target").value,
        });
        showError(null);
      } catch (err) {
        showError(err);
      }
      await refresh();
    }

    $("source").addEventListener("change", select);
    $("target").addEventListener("change", select);

    $("load").addEventListener("click", async () => {
      $("status").textContent = "Loading model...";
      try {
        await call("POST", "/api/model/load");
        showError(null);
      } catch (err) {
        showError(err);
      }
      await refresh();
    });

    $("clear").addEventListener("click", async () => {
      await call("DELETE", "/api/history");
      $("output").value = "";
      await refresh();
    });

    $("translate").addEventListener("click", async () => {
      $("translate").disabled = true;
      $("status").textContent = "Translating...";
      try {
        const exchange = await call("POST", "/api/translate", {
          text: $("input").value,
          source_lang: $("source").value,
          target_lang: $("target").value,
        });
        $("output").value = exchange.assistant.text;
        showError(null);
      } catch (err) {
        showError(err);
      } finally {
        $("translate").disabled = false;
      }
      await refresh();
    });

    init().catch(showError);
  </script>
</body>
</html>
"#;
