//! The `templates/` tree compiled into the binary

use create_app_core::templates::BundledFile;

macro_rules! bundle {
    ($($path:literal),* $(,)?) => {
        &[$(BundledFile {
            path: $path,
            contents: include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates/", $path)),
        }),*]
    };
}

pub static TEMPLATES: &[BundledFile] = bundle![
    "template.yaml",
    "gitignore",
    "README-template.md",
    "default/template.yaml",
    "default/.eslintrc.json",
    "default/jsconfig.json",
    "default/next-env.d.ts",
    "default/next.config.js",
    "default/tsconfig.json",
    "default/pages/_app.js",
    "default/pages/_app.tsx",
    "default/pages/_document.js",
    "default/pages/_document.tsx",
    "default/pages/api/hello.js",
    "default/pages/api/hello.ts",
    "default/pages/index.js",
    "default/pages/index.tsx",
    "default/public/next.svg",
    "default/public/vercel.svg",
    "default/styles/Home.module.css",
    "default/styles/globals.css",
    "app/template.yaml",
    "app/.eslintrc.json",
    "app/jsconfig.json",
    "app/next-env.d.ts",
    "app/next.config.js",
    "app/tsconfig.json",
    "app/app/globals.css",
    "app/app/layout.js",
    "app/app/layout.tsx",
    "app/app/page.js",
    "app/app/page.module.css",
    "app/app/page.tsx",
    "app/public/next.svg",
    "app/public/vercel.svg",
];
