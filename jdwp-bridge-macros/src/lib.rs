use proc_macro::TokenStream;

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Attribute, Data, DataEnum, DeriveInput, Error, Fields, Index, LitInt, Token, Type,
};

fn enum_repr(attrs: &[Attribute], data: &DataEnum) -> syn::Result<Type> {
    match attrs.iter().find(|attr| attr.path().is_ident("repr")) {
        Some(repr) => repr.parse_args::<Type>(),
        None => Err(Error::new(data.enum_token.span, "No explicit repr")),
    }
}

fn discriminant(variant: &syn::Variant) -> syn::Result<&syn::Expr> {
    match variant.discriminant {
        Some((_, ref d)) => Ok(d),
        None => Err(Error::new(variant.span(), "No explicit discriminant")),
    }
}

#[proc_macro_derive(JdwpReadable)]
pub fn jdwp_readable(item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as DeriveInput);
    match readable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn readable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(struct_data) => match &struct_data.fields {
            Fields::Unit => quote!(Ok(Self)),
            Fields::Named(named) => {
                let fields = named.named.iter().map(|f| {
                    let name = &f.ident;
                    quote!(#name: ::jdwp_bridge::codec::JdwpReadable::read(read)?)
                });
                quote!(Ok(Self { #(#fields),* }))
            }
            Fields::Unnamed(unnamed) => {
                let fields = unnamed
                    .unnamed
                    .iter()
                    .map(|_| quote!(::jdwp_bridge::codec::JdwpReadable::read(read)?));
                quote!(Ok(Self(#(#fields),*)))
            }
        },
        Data::Enum(enum_data) => {
            let repr = enum_repr(&input.attrs, enum_data)?;

            let mut match_arms = Vec::with_capacity(enum_data.variants.len());
            for v in &enum_data.variants {
                let d = discriminant(v)?;
                let name = &v.ident;
                let constructor = match &v.fields {
                    Fields::Named(named) => {
                        let fields = named.named.iter().map(|f| &f.ident);
                        quote!({ #(#fields: ::jdwp_bridge::codec::JdwpReadable::read(read)?,)* })
                    }
                    Fields::Unnamed(unnamed) => {
                        let fields = unnamed
                            .unnamed
                            .iter()
                            .map(|_| quote!(::jdwp_bridge::codec::JdwpReadable::read(read)?));
                        quote!(( #(#fields),* ))
                    }
                    Fields::Unit => quote!(),
                };
                match_arms.push(quote!(x if x == (#d) => Self::#name #constructor));
            }

            let message = format!("unknown {ident} discriminant {{}}");
            quote! {
                let res = match <#repr as ::jdwp_bridge::codec::JdwpReadable>::read(read)? {
                    #(#match_arms,)*
                    other => {
                        return Err(::std::io::Error::new(
                            ::std::io::ErrorKind::InvalidData,
                            format!(#message, other),
                        ))
                    }
                };
                Ok(res)
            }
        }
        Data::Union(union_data) => {
            return Err(Error::new(
                union_data.union_token.span,
                "Can derive JdwpReadable only for structs and enums with explicit discriminants",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::jdwp_bridge::codec::JdwpReadable for #ident #ty_generics #where_clause {
            fn read<R: ::std::io::Read>(
                read: &mut ::jdwp_bridge::codec::JdwpReader<R>,
            ) -> ::std::io::Result<Self> {
                #body
            }
        }
    })
}

#[proc_macro_derive(JdwpWritable)]
pub fn jdwp_writable(item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as DeriveInput);
    match writable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn writable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(struct_data) => match &struct_data.fields {
            Fields::Unit => quote!(),
            Fields::Named(named) => {
                let fields = named.named.iter().map(|f| {
                    let name = &f.ident;
                    quote!(::jdwp_bridge::codec::JdwpWritable::write(&self.#name, write)?)
                });
                quote!(#(#fields;)*)
            }
            Fields::Unnamed(unnamed) => {
                let fields = (0..unnamed.unnamed.len()).map(|i| {
                    let idx = Index::from(i);
                    quote!(::jdwp_bridge::codec::JdwpWritable::write(&self.#idx, write)?)
                });
                quote!(#(#fields;)*)
            }
        },
        Data::Enum(enum_data) => {
            let repr = enum_repr(&input.attrs, enum_data)?;

            let mut match_arms = Vec::with_capacity(enum_data.variants.len());
            for v in &enum_data.variants {
                let d = discriminant(v)?;
                let names = match &v.fields {
                    Fields::Named(named) => named
                        .named
                        .iter()
                        .filter_map(|f| f.ident.clone())
                        .collect::<Vec<_>>(),
                    Fields::Unnamed(unnamed) => (0..unnamed.unnamed.len())
                        .map(|i| format_ident!("case_{}", i))
                        .collect(),
                    Fields::Unit => Vec::new(),
                };
                let destruct = match &v.fields {
                    Fields::Named(_) => quote!({ #(#names),* }),
                    Fields::Unnamed(_) => quote!(( #(#names),* )),
                    Fields::Unit => quote!(),
                };
                let name = &v.ident;
                match_arms.push(quote! {
                    Self::#name #destruct => {
                        <#repr as ::jdwp_bridge::codec::JdwpWritable>::write(&(#d), write)?;
                        #(::jdwp_bridge::codec::JdwpWritable::write(#names, write)?;)*
                    }
                });
            }
            quote! {
                match self {
                    #(#match_arms)*
                }
            }
        }
        Data::Union(union_data) => {
            return Err(Error::new(
                union_data.union_token.span,
                "Can derive JdwpWritable only for structs and enums with explicit discriminants",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::jdwp_bridge::codec::JdwpWritable for #ident #ty_generics #where_clause {
            fn write<W: ::std::io::Write>(
                &self,
                write: &mut ::jdwp_bridge::codec::JdwpWriter<W>,
            ) -> ::std::io::Result<()> {
                #body
                Ok(())
            }
        }
    })
}

struct CommandAttr {
    reply_type: Option<Type>,
    command_set: LitInt,
    command_id: LitInt,
}

impl Parse for CommandAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // either `Reply, set, id` or just `set, id`
        let reply_type = if input.peek(LitInt) {
            None
        } else {
            let ty = input.parse()?;
            input.parse::<Token![,]>()?;
            Some(ty)
        };
        let command_set = input.parse()?;
        input.parse::<Token![,]>()?;
        Ok(CommandAttr {
            reply_type,
            command_set,
            command_id: input.parse()?,
        })
    }
}

#[proc_macro_attribute]
pub fn jdwp_command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = syn::parse_macro_input!(attr as CommandAttr);
    let item = syn::parse_macro_input!(item as syn::ItemStruct);
    match command(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn command(attr: CommandAttr, item: syn::ItemStruct) -> syn::Result<TokenStream2> {
    let CommandAttr {
        reply_type,
        command_set,
        command_id,
    } = attr;

    let ident = &item.ident;
    let reply_type = match reply_type {
        Some(ty) => ty,
        None => syn::parse_str(&format!("{ident}Reply"))?,
    };
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let new = if item.fields.is_empty() {
        quote!()
    } else {
        let mut docs = Vec::with_capacity(item.fields.len());
        let mut params = Vec::with_capacity(item.fields.len());
        let mut inits = Vec::with_capacity(item.fields.len());
        for f in &item.fields {
            let Some(ref name) = f.ident else {
                return Err(Error::new(
                    item.fields.span(),
                    "Command struct must use named fields",
                ));
            };
            let ty = &f.ty;

            // plain string fields accept anything string-like
            let is_string = quote!(#ty).to_string() == "String";
            if is_string {
                params.push(quote!(#name: impl Into<String>));
                inits.push(quote!(#name: #name.into()));
            } else {
                params.push(quote!(#name: #ty));
                inits.push(quote!(#name));
            }

            let field_docs = f.attrs.iter().filter(|a| a.path().is_ident("doc"));
            let header = format!(" - `{name}`:");
            docs.push(quote! {
                #[doc = #header]
                #(#field_docs)*
            });
        }
        quote! {
            impl #impl_generics #ident #ty_generics #where_clause {
                /// Creates the command.
                ///
                /// ### Arguments:
                #(#docs)*
                pub fn new(#(#params),*) -> Self {
                    Self { #(#inits),* }
                }
            }
        }
    };

    Ok(quote! {
        #item
        #new

        impl #impl_generics ::jdwp_bridge::spec::Command for #ident #ty_generics #where_clause {
            const ID: ::jdwp_bridge::spec::CommandId =
                ::jdwp_bridge::spec::CommandId::new(#command_set, #command_id);
            type Output = #reply_type;
        }
    })
}
