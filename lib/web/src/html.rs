//! HTML pages served to browsers: the interactive query page and the result table.

use std::fmt::Write;

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Renders the page with the query and update forms.
pub fn query_page(source: &str, host: &str, endpoint: &str) -> String {
    let source = escape(source);
    let host = escape(host);
    let endpoint = escape(endpoint);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>ADHS SPARQL Endpoint</title>
</head>
<body>
    <h1>ADHS SPARQL Endpoint</h1>
    <p>Serving <code>{source}</code> at <code>{host}{endpoint}</code>.</p>
    <h2>Query</h2>
    <form method="post" action="{endpoint}" enctype="application/x-www-form-urlencoded">
        <textarea name="query" rows="12" cols="80">SELECT * WHERE {{ ?s ?p ?o }} LIMIT 10</textarea>
        <br>
        <input type="submit" value="Run query">
    </form>
    <h2>Update</h2>
    <form method="post" action="{endpoint}" enctype="application/x-www-form-urlencoded">
        <textarea name="update" rows="8" cols="80"></textarea>
        <br>
        <input type="submit" value="Run update">
    </form>
</body>
</html>
"#
    )
}

/// Renders a results page around a table.
pub fn results_page(header: &[&str], rows: &[Vec<String>]) -> Result<String, std::fmt::Error> {
    let mut table = String::from("    <tr>\n");
    for name in header {
        writeln!(table, "        <th>{}</th>", escape(name))?;
    }
    table.push_str("    </tr>\n");
    for row in rows {
        table.push_str("    <tr>\n");
        for cell in row {
            writeln!(table, "        <td>{}</td>", escape(cell))?;
        }
        table.push_str("    </tr>\n");
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>ADHS SPARQL Results</title>
</head>
<body>
<table>
{table}</table>
</body>
</html>
"#
    ))
}
