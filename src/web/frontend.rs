//! Embedded HTML/CSS/JS frontend for the oeeview dashboard.
//!
//! The whole page is compiled into the binary as a string constant. Charts
//! are drawn as inline SVG; no external assets or CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>oeeview</title>
<style>
:root {
  --bg: #f5f7fa;
  --surface: #ffffff;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
  --accent: #143d60;
  --accent-2: #6c2dd2;
  --green: #1a7f37;
  --red: #cf222e;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; }
.app { max-width: 1280px; margin: 0 auto; padding: 24px; }

header {
  display: flex; align-items: center; justify-content: space-between;
  margin-bottom: 20px; padding-bottom: 12px; border-bottom: 2px solid var(--accent);
}
header h1 { font-size: 22px; color: var(--accent); }
.status { font-size: 12px; color: var(--text-muted); }
.dot { display: inline-block; width: 8px; height: 8px; border-radius: 50%; margin-right: 6px; background: var(--text-muted); }
.dot.online { background: var(--green); }
.dot.offline { background: var(--red); }

.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; margin-bottom: 20px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 14px; }
.card .label { font-size: 11px; color: var(--text-muted); text-transform: uppercase; letter-spacing: .04em; }
.card .value { font-size: 24px; font-weight: 700; color: var(--accent); margin-top: 6px; }

.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.panel { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); }
.panel h2 {
  font-size: 13px; font-weight: 600; color: var(--accent); padding: 10px 14px;
  border-bottom: 1px solid var(--border); display: flex; justify-content: space-between; align-items: center;
}
.panel .body { padding: 14px; }
.panel select { font-size: 12px; padding: 2px 6px; }

svg.chart { width: 100%; height: 280px; }
svg.chart.short { height: 190px; }
.row { margin-bottom: 16px; }
.row.split { display: grid; grid-template-columns: 7fr 3fr; gap: 16px; }
.legend { font-size: 11px; color: var(--text-muted); font-weight: 400; }
.legend i { display: inline-block; width: 8px; height: 8px; border-radius: 50%; margin: 0 4px 0 10px; }
.shares { display: flex; gap: 8px; flex-wrap: wrap; }
.share { flex: 1; min-width: 120px; }
.share .bar { height: 8px; border-radius: 4px; background: var(--border); margin-top: 6px; overflow: hidden; }
.share .bar div { height: 100%; background: var(--accent-2); }
svg.chart text { font-size: 10px; fill: var(--text-muted); }

table { width: 100%; border-collapse: collapse; margin-top: 12px; }
th { background: linear-gradient(90deg, var(--accent), var(--accent-2)); color: #fff; font-size: 11px; padding: 8px; }
td { padding: 7px 8px; border-bottom: 1px solid var(--border); text-align: center; font-size: 13px; }
td:first-child { text-align: left; text-transform: capitalize; }
tr.vital td { font-weight: 600; }
.empty { color: var(--text-muted); text-align: center; padding: 40px 0; }
.error { color: var(--red); font-size: 12px; }
@media (max-width: 900px) { .grid, .cards { grid-template-columns: 1fr; } }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>OEE Monitor</h1>
    <div class="status"><span id="dot" class="dot"></span><span id="status">checking backend…</span></div>
  </header>

  <div class="cards">
    <div class="card"><div class="label">OEE</div><div class="value" id="g-oee">–</div></div>
    <div class="card"><div class="label">Availability</div><div class="value" id="g-availability">–</div></div>
    <div class="card"><div class="label">Performance</div><div class="value" id="g-performance">–</div></div>
    <div class="card"><div class="label">Quality</div><div class="value" id="g-quality">–</div></div>
    <div class="card"><div class="label">Run time</div><div class="value" id="s-run">–</div></div>
    <div class="card"><div class="label">Stop time</div><div class="value" id="s-stop">–</div></div>
    <div class="card"><div class="label">Good parts</div><div class="value" id="s-good">–</div></div>
    <div class="card"><div class="label">Rejected parts</div><div class="value" id="s-rejected">–</div></div>
    <div class="card"><div class="label">Plan <span id="plan-part"></span></div><div class="value" id="o-plan">NIL</div></div>
    <div class="card"><div class="label">Actual</div><div class="value" id="o-actual">NIL</div></div>
    <div class="card"><div class="label">Attainment</div><div class="value" id="o-attainment">–</div></div>
    <div class="card"><div class="label">Output share</div><div class="shares" id="o-shares"></div></div>
  </div>

  <div class="row split">
    <div class="panel">
      <h2>RUNNING TIME
        <span class="legend"><i style="background:#e97451"></i>on target<i style="background:#cf222e"></i>below target</span>
      </h2>
      <div class="body" id="running-time"></div>
    </div>
    <div class="panel">
      <h2>PLAN VS ACTUAL
        <span class="legend"><i style="background:#2563eb"></i>plan<i style="background:#16a34a"></i>actual</span>
      </h2>
      <div class="body" id="plan-actual"></div>
    </div>
  </div>

  <div class="row">
    <div class="panel">
      <h2>OEE HISTORY
        <span class="legend"><i style="background:#143d60"></i>shift-1<i style="background:#6c2dd2"></i>shift-2</span>
      </h2>
      <div class="body" id="oee-history"></div>
    </div>
  </div>

  <div class="grid">
    <div class="panel">
      <h2>STOPPAGE ANALYSIS <span class="error" id="stoppage-error"></span></h2>
      <div class="body" id="stoppages"></div>
    </div>
    <div class="panel">
      <h2>REJECTION ANALYSIS
        <select id="part"><option value="all">ANALYSIS FOR PARTS</option></select>
      </h2>
      <div class="body" id="rejections"></div>
    </div>
  </div>
</div>

<script>
let pollMs = 20000;
let healthMs = 15000;
let timers = [];

async function getJson(path) {
  const res = await fetch(path);
  if (!res.ok) throw new Error(`${path}: ${res.status}`);
  return res.json();
}

function esc(s) {
  return String(s).replace(/[&<>"]/g, c => ({'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;'}[c]));
}

function paretoChart(entries, unit) {
  const w = 560, h = 280, pad = { l: 44, r: 40, t: 12, b: 56 };
  const iw = w - pad.l - pad.r, ih = h - pad.t - pad.b;
  const max = Math.max(...entries.map(e => e.amount), 1);
  const bw = iw / entries.length;
  let bars = '', points = [], labels = '';
  entries.forEach((e, i) => {
    const bh = e.amount / max * ih;
    const x = pad.l + i * bw;
    bars += `<rect x="${x + bw * 0.15}" y="${pad.t + ih - bh}" width="${bw * 0.7}" height="${bh}" rx="3" fill="#143d60"><title>${esc(e.category)}: ${e.amount} ${unit}</title></rect>`;
    points.push(`${x + bw / 2},${pad.t + ih - e.cumulative_percent / 100 * ih}`);
    labels += `<text x="${x + bw / 2}" y="${h - pad.b + 14}" text-anchor="end" transform="rotate(-30 ${x + bw / 2} ${h - pad.b + 14})">${esc(e.category).slice(0, 18)}</text>`;
  });
  const line = `<polyline points="${points.join(' ')}" fill="none" stroke="#6c2dd2" stroke-width="2"/>` +
    points.map(p => `<circle cx="${p.split(',')[0]}" cy="${p.split(',')[1]}" r="3" fill="#6c2dd2"/>`).join('');
  const axes = `<line x1="${pad.l}" y1="${pad.t + ih}" x2="${w - pad.r}" y2="${pad.t + ih}" stroke="#143d60"/>` +
    `<text x="${pad.l - 6}" y="${pad.t + 8}" text-anchor="end">${max}</text>` +
    `<text x="${w - pad.r + 6}" y="${pad.t + 8}">100%</text>` +
    `<text x="${w - pad.r + 6}" y="${pad.t + ih / 2}">50%</text>`;
  return `<svg class="chart" viewBox="0 0 ${w} ${h}">${axes}${bars}${line}${labels}</svg>`;
}

function paretoTable(pareto, heading, unit) {
  const vital = new Set(pareto.vital_few);
  const rows = pareto.entries.map(e =>
    `<tr class="${vital.has(e.category) ? 'vital' : ''}"><td>${esc(e.category)}</td><td>${e.amount}</td><td>${e.cumulative_percent.toFixed(1)}%</td></tr>`
  ).join('');
  return `<table><thead><tr><th>${heading}</th><th>${unit}</th><th>CUMULATIVE %</th></tr></thead><tbody>${rows}</tbody></table>`;
}

function renderPareto(el, pareto, heading, unit) {
  if (!pareto.entries.length) {
    el.innerHTML = '<div class="empty">No data yet</div>';
    return;
  }
  el.innerHTML = paretoChart(pareto.entries, unit) + paretoTable(pareto, heading, unit);
}

function runningTimeChart(rt) {
  const w = 900, h = 190, pad = { l: 36, r: 70, t: 12, b: 22 };
  const iw = w - pad.l - pad.r, ih = h - pad.t - pad.b;
  const max = Math.max(120, rt.target * 1.5, ...rt.buckets.map(b => b.count));
  const bw = iw / rt.buckets.length;
  const y = v => pad.t + ih - v / max * ih;
  let bars = '';
  rt.buckets.forEach((b, i) => {
    const x = pad.l + i * bw;
    const fill = b.meets_target ? '#e97451' : '#cf222e';
    bars += `<rect x="${x + 1}" y="${y(b.count)}" width="${bw - 2}" height="${pad.t + ih - y(b.count)}" fill="${fill}"><title>${b.label}:00 total ${b.count}</title></rect>`;
    bars += `<text x="${x + bw / 2}" y="${h - 6}" text-anchor="middle">${b.label}</text>`;
  });
  const target = `<line x1="${pad.l}" y1="${y(rt.target)}" x2="${w - pad.r}" y2="${y(rt.target)}" stroke="#8b4513" stroke-dasharray="3 3"/>` +
    `<text x="${w - pad.r + 4}" y="${y(rt.target) + 3}">target ${rt.target}</text>`;
  const axis = `<line x1="${pad.l}" y1="${pad.t + ih}" x2="${w - pad.r}" y2="${pad.t + ih}" stroke="#666"/>` +
    `<text x="${pad.l - 6}" y="${pad.t + 8}" text-anchor="end">${Math.round(max)}</text>`;
  return `<svg class="chart short" viewBox="0 0 ${w} ${h}">${axis}${bars}${target}</svg>`;
}

function lineChart(labels, series, opts) {
  const w = opts.width, h = 190, pad = { l: 36, r: 12, t: 12, b: 40 };
  const iw = w - pad.l - pad.r, ih = h - pad.t - pad.b;
  const values = series.flatMap(s => s.values).filter(v => v !== null);
  const max = opts.max || Math.max(...values, 1);
  const step = labels.length > 1 ? iw / (labels.length - 1) : 0;
  const px = i => pad.l + (labels.length > 1 ? i * step : iw / 2);
  const py = v => pad.t + ih - v / max * ih;
  let out = `<line x1="${pad.l}" y1="${pad.t + ih}" x2="${w - pad.r}" y2="${pad.t + ih}" stroke="#666"/>` +
    `<text x="${pad.l - 6}" y="${pad.t + 8}" text-anchor="end">${Math.round(max)}</text>`;
  labels.forEach((l, i) => {
    out += `<text x="${px(i)}" y="${h - pad.b + 14}" text-anchor="end" transform="rotate(-30 ${px(i)} ${h - pad.b + 14})">${esc(l)}</text>`;
  });
  for (const s of series) {
    const pts = s.values.map((v, i) => v === null ? null : `${px(i)},${py(v)}`);
    // a missing value breaks the line
    let run = [];
    for (const p of pts.concat([null])) {
      if (p) { run.push(p); continue; }
      if (run.length > 1) out += `<polyline points="${run.join(' ')}" fill="none" stroke="${s.color}" stroke-width="2"/>`;
      run = [];
    }
    pts.forEach(p => { if (p) out += `<circle cx="${p.split(',')[0]}" cy="${p.split(',')[1]}" r="3" fill="${s.color}"/>`; });
  }
  return `<svg class="chart short" viewBox="0 0 ${w} ${h}">${out}</svg>`;
}

function renderProduction(rt, hist, out) {
  const rtEl = document.getElementById('running-time');
  rtEl.innerHTML = rt.buckets.length ? runningTimeChart(rt) : '<div class="empty">No data yet</div>';

  const paEl = document.getElementById('plan-actual');
  paEl.innerHTML = rt.plan_actual.length
    ? lineChart(rt.plan_actual.map(p => p.label), [
        { color: '#2563eb', values: rt.plan_actual.map(p => p.plan) },
        { color: '#16a34a', values: rt.plan_actual.map(p => p.actual) },
      ], { width: 400 })
    : '<div class="empty">No data yet</div>';

  const histEl = document.getElementById('oee-history');
  const colors = ['#143d60', '#6c2dd2'];
  histEl.innerHTML = hist.days.length
    ? lineChart(hist.days.map(d => d.label), hist.shifts.map((name, i) => ({
        color: colors[i], values: hist.days.map(d => name in d.shifts ? d.shifts[name] : null),
      })), { width: 1200, max: 100 })
    : '<div class="empty">No data yet</div>';

  document.getElementById('plan-part').textContent = out.part ? `(${out.part})` : '';
  document.getElementById('o-plan').textContent = out.plan;
  document.getElementById('o-actual').textContent = out.actual;
  document.getElementById('o-attainment').textContent =
    out.attainment_pct === null ? '–' : out.attainment_pct.toFixed(1) + '%';
  document.getElementById('o-shares').innerHTML = out.shares.map(s =>
    `<div class="share"><div class="label">${esc(s.part)} ${s.percent.toFixed(1)}%</div><div class="bar"><div style="width:${s.percent}%"></div></div></div>`
  ).join('');
}

async function refresh() {
  const part = document.getElementById('part').value;
  try {
    const s = await getJson('/api/pareto/stoppages');
    renderPareto(document.getElementById('stoppages'), s.pareto, 'STOPPAGE REASON', 'DURATION (min)');
    document.getElementById('stoppage-error').textContent = s.freshness.last_error ? 'last refresh failed' : '';
  } catch (e) { console.error(e); }
  try {
    const r = await getJson('/api/pareto/rejections?part=' + encodeURIComponent(part));
    renderPareto(document.getElementById('rejections'), r.pareto, 'REJECTION REASON', 'COUNT');
  } catch (e) { console.error(e); }
  try {
    const sum = await getJson('/api/summary?part=' + encodeURIComponent(part));
    for (const k of ['oee', 'availability', 'performance', 'quality']) {
      document.getElementById('g-' + k).textContent = sum.gauges[k].toFixed(1) + '%';
    }
    document.getElementById('s-run').textContent = sum.availability.run_hours.toFixed(2) + ' h';
    document.getElementById('s-stop').textContent = sum.availability.stop_hours.toFixed(2) + ' h';
    document.getElementById('s-good').textContent = sum.quality.good;
    document.getElementById('s-rejected').textContent = sum.quality.rejected;
  } catch (e) { console.error(e); }
  try {
    const [rt, hist, out] = await Promise.all(
      ['/api/running-time', '/api/oee-history', '/api/output'].map(getJson));
    renderProduction(rt, hist, out);
  } catch (e) { console.error(e); }
}

async function loadParts() {
  const select = document.getElementById('part');
  try {
    const { parts } = await getJson('/api/parts');
    for (const p of parts) {
      const opt = document.createElement('option');
      opt.value = p.name;
      opt.textContent = p.number ? `${p.name} (${p.number})` : p.name;
      select.appendChild(opt);
    }
  } catch (e) { console.error(e); }
  select.addEventListener('change', refresh);
}

async function checkHealth() {
  try {
    const h = await getJson('/api/health');
    pollMs = h.poll_interval_secs * 1000;
    healthMs = h.health_interval_secs * 1000;
    if (h.backend_online === null) {
      document.getElementById('dot').className = 'dot';
      document.getElementById('status').textContent = 'checking backend…';
      return;
    }
    document.getElementById('dot').className = 'dot ' + (h.backend_online ? 'online' : 'offline');
    document.getElementById('status').textContent =
      (h.backend_online ? 'backend online' : 'backend offline') + ' · checked ' +
      new Date(h.checked_at).toLocaleTimeString();
  } catch (e) {
    document.getElementById('dot').className = 'dot offline';
    document.getElementById('status').textContent = 'dashboard unreachable';
  }
}

(async () => {
  await checkHealth();
  await loadParts();
  await refresh();
  timers.push(setInterval(refresh, pollMs));
  timers.push(setInterval(checkHealth, healthMs));
  window.addEventListener('beforeunload', () => timers.forEach(clearInterval));
})();
</script>
</body>
</html>
"##;
